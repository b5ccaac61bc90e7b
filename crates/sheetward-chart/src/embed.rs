//! Building charts from a cell range and attaching them to a sheet

use crate::error::{ChartError, ChartResult};
use log::debug;
use sheetward_core::{
    CellAddress, CellRange, Chart, ChartAnchor, ChartKind, DataReference, DataSeries, Workbook,
};

/// Request to chart a block of cells
///
/// `range` must cover at least two rows and two columns. Its first row holds
/// series names, its first column holds categories (X values for scatter
/// charts), and every further column becomes one series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ChartSpec {
    pub sheet: String,
    pub kind: ChartKind,
    pub range: CellRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub x_axis_title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y_axis_title: Option<String>,
    /// Top-left cell of the chart frame
    pub anchor: CellAddress,
    /// Frame size as (columns, rows); [`ChartAnchor::DEFAULT_SIZE`] when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Option<(u32, u32)>,
}

impl ChartSpec {
    /// Create a request with no titles and the default frame size
    pub fn new<S: Into<String>>(
        sheet: S,
        kind: ChartKind,
        range: CellRange,
        anchor: CellAddress,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            kind,
            range,
            title: None,
            x_axis_title: None,
            y_axis_title: None,
            anchor,
            size: None,
        }
    }

    /// Set chart title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set both axis titles
    pub fn with_axis_titles<X: Into<String>, Y: Into<String>>(mut self, x: X, y: Y) -> Self {
        self.x_axis_title = Some(x.into());
        self.y_axis_title = Some(y.into());
        self
    }

    /// Set frame size in columns and rows
    pub fn with_size(mut self, cols: u32, rows: u32) -> Self {
        self.size = Some((cols, rows));
        self
    }
}

/// Validate `spec` and append the resulting chart to its sheet
///
/// Existing charts on the sheet are kept. Nothing is modified when an error
/// is returned.
pub fn add_chart(wb: &mut Workbook, spec: ChartSpec) -> ChartResult<()> {
    let available = wb.sheet_names();
    let sheet = wb
        .worksheet_by_name_mut(&spec.sheet)
        .ok_or_else(|| ChartError::SheetNotFound {
            requested: spec.sheet.clone(),
            available,
        })?;

    let chart = build_chart(&spec)?;
    debug!(
        "adding {} chart with {} series to '{}' at {}",
        chart.kind,
        chart.series.len(),
        spec.sheet,
        spec.anchor
    );
    sheet.add_chart(chart);
    Ok(())
}

/// Derive the chart for `spec` without attaching it
pub fn build_chart(spec: &ChartSpec) -> ChartResult<Chart> {
    let range = CellRange::new(spec.range.start, spec.range.end);
    range
        .validate()
        .map_err(|e| ChartError::invalid_range(range, e.to_string()))?;
    if range.col_count() < 2 {
        return Err(ChartError::invalid_range(
            range,
            "needs a category column and at least one value column",
        ));
    }
    if range.row_count() < 2 {
        return Err(ChartError::invalid_range(
            range,
            "needs a header row and at least one data row",
        ));
    }

    if spec.anchor.validate().is_err() {
        return Err(ChartError::AnchorOutOfBounds {
            row: spec.anchor.row,
            col: spec.anchor.col,
        });
    }

    let (cols, rows) = spec.size.unwrap_or(ChartAnchor::DEFAULT_SIZE);
    let anchor = ChartAnchor::with_size(spec.anchor, cols.max(1), rows.max(1));

    let header_row = range.start.row;
    let first_data_row = header_row + 1;
    let category_col = range.start.col;
    let categories = DataReference::new(
        spec.sheet.as_str(),
        CellRange::new(
            CellAddress::new(first_data_row, category_col),
            CellAddress::new(range.end.row, category_col),
        ),
    );

    let mut chart = Chart::new(spec.kind, anchor);
    chart.title = spec.title.clone();
    if spec.kind.has_axes() {
        chart.x_axis_title = spec.x_axis_title.clone();
        chart.y_axis_title = spec.y_axis_title.clone();
    }
    chart.series = (category_col + 1..=range.end.col)
        .map(|col| DataSeries {
            name: Some(DataReference::cell(
                spec.sheet.as_str(),
                CellAddress::new(header_row, col),
            )),
            categories: Some(categories.clone()),
            values: DataReference::new(
                spec.sheet.as_str(),
                CellRange::new(
                    CellAddress::new(first_data_row, col),
                    CellAddress::new(range.end.row, col),
                ),
            ),
        })
        .collect();

    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Sales Data").unwrap();
        wb
    }

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    #[test]
    fn test_series_reference_cells() {
        let spec = ChartSpec::new("Sales Data", ChartKind::Bar, range("A1:C4"), CellAddress::new(2, 5))
            .with_title("Quarterly");
        let chart = build_chart(&spec).unwrap();

        assert_eq!(chart.title.as_deref(), Some("Quarterly"));
        assert_eq!(chart.series.len(), 2);
        let second = &chart.series[1];
        assert_eq!(
            second.name.as_ref().map(DataReference::formula).as_deref(),
            Some("'Sales Data'!$C$1")
        );
        assert_eq!(
            second.categories.as_ref().map(DataReference::formula).as_deref(),
            Some("'Sales Data'!$A$2:$A$4")
        );
        assert_eq!(second.values.formula(), "'Sales Data'!$C$2:$C$4");
        assert_eq!(chart.anchor, ChartAnchor::with_size(CellAddress::new(2, 5), 8, 15));
    }

    #[test]
    fn test_hand_built_range_is_normalized() {
        let flipped = CellRange {
            start: CellAddress::new(4, 3),
            end: CellAddress::new(1, 1),
        };
        let anchor = CellAddress::new(2, 5);
        let from_flipped =
            build_chart(&ChartSpec::new("Sales Data", ChartKind::Bar, flipped, anchor)).unwrap();
        let from_parsed =
            build_chart(&ChartSpec::new("Sales Data", ChartKind::Bar, range("A1:C4"), anchor))
                .unwrap();
        assert_eq!(from_flipped, from_parsed);
    }

    #[test]
    fn test_charts_accumulate() {
        let mut wb = workbook();
        let spec = ChartSpec::new("Sales Data", ChartKind::Line, range("A1:B3"), CellAddress::new(1, 4));
        add_chart(&mut wb, spec.clone()).unwrap();
        add_chart(&mut wb, spec.with_size(4, 4)).unwrap();

        let charts = wb.worksheet_by_name("Sales Data").unwrap().charts();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[1].anchor.to, CellAddress::new(5, 8));
    }

    #[test]
    fn test_single_column_rejected() {
        let mut wb = workbook();
        let spec = ChartSpec::new("Sales Data", ChartKind::Bar, range("A1:A5"), CellAddress::new(1, 3));
        let err = add_chart(&mut wb, spec).unwrap_err();
        assert_eq!(err.code(), "invalid_range");
        assert!(wb.worksheet(1).unwrap().charts().is_empty());
    }

    #[test]
    fn test_header_only_rejected() {
        let spec = ChartSpec::new("Sales Data", ChartKind::Pie, range("A1:D1"), CellAddress::new(1, 6));
        assert!(matches!(
            build_chart(&spec),
            Err(ChartError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_zero_coordinates_rejected() {
        let bad_range = CellRange {
            start: CellAddress::new(0, 1),
            end: CellAddress::new(3, 2),
        };
        let spec = ChartSpec::new("Sales Data", ChartKind::Bar, bad_range, CellAddress::new(1, 4));
        assert_eq!(build_chart(&spec).unwrap_err().code(), "invalid_range");

        let spec = ChartSpec::new("Sales Data", ChartKind::Bar, range("A1:B3"), CellAddress::new(0, 4));
        assert_eq!(
            build_chart(&spec).unwrap_err(),
            ChartError::AnchorOutOfBounds { row: 0, col: 4 }
        );
    }

    #[test]
    fn test_unknown_sheet() {
        let mut wb = workbook();
        let spec = ChartSpec::new("Missing", ChartKind::Bar, range("A1:B3"), CellAddress::new(1, 4));
        assert_eq!(
            add_chart(&mut wb, spec).unwrap_err(),
            ChartError::SheetNotFound {
                requested: "Missing".into(),
                available: vec!["Sheet1".into(), "Sales Data".into()],
            }
        );
    }

    #[test]
    fn test_pie_drops_axis_titles() {
        let spec = ChartSpec::new("Sales Data", ChartKind::Pie, range("A1:B3"), CellAddress::new(1, 4))
            .with_axis_titles("Month", "Revenue");
        let chart = build_chart(&spec).unwrap();
        assert_eq!(chart.x_axis_title, None);
        assert_eq!(chart.y_axis_title, None);

        let spec = ChartSpec { kind: ChartKind::Scatter, ..spec };
        let chart = build_chart(&spec).unwrap();
        assert_eq!(chart.x_axis_title.as_deref(), Some("Month"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{"sheet": "Sales Data", "kind": "line", "range": "A1:C5", "anchor": [2, 5], "size": [6, 10]}"#,
        )
        .unwrap();
        assert_eq!(
            spec,
            ChartSpec::new("Sales Data", ChartKind::Line, range("A1:C5"), CellAddress::new(2, 5))
                .with_size(6, 10)
        );
    }
}
