//! Read-only navigation over a workbook
//!
//! These functions never mutate and never allocate per cell beyond what the
//! caller asks for: formula text and styles are borrowed from the model and
//! only attached to a [`CellView`] when requested.

use crate::cell::{CellAddress, CellValue};
use crate::error::AccessError;
use crate::style::Style;
use crate::workbook::{SheetVisibility, Workbook};
use crate::worksheet::Worksheet;

/// Sheet names in workbook order
pub fn sheet_names(wb: &Workbook) -> Vec<String> {
    wb.sheet_names()
}

/// Look up a sheet by exact name, or the active sheet when `name` is `None`
pub fn get_sheet<'a>(wb: &'a Workbook, name: Option<&str>) -> Result<&'a Worksheet, AccessError> {
    let index = resolve_sheet_index(wb, name)?;
    wb.worksheet(index).ok_or(AccessError::NoSheets)
}

/// Mutable variant of [`get_sheet`]
pub fn get_sheet_mut<'a>(
    wb: &'a mut Workbook,
    name: Option<&str>,
) -> Result<&'a mut Worksheet, AccessError> {
    let index = resolve_sheet_index(wb, name)?;
    wb.worksheet_mut(index).ok_or(AccessError::NoSheets)
}

fn resolve_sheet_index(wb: &Workbook, name: Option<&str>) -> Result<usize, AccessError> {
    if wb.is_empty() {
        return Err(AccessError::NoSheets);
    }
    match name {
        None => Ok(wb.active_sheet().min(wb.sheet_count() - 1)),
        Some(name) => wb
            .sheet_index(name)
            .ok_or_else(|| AccessError::SheetNotFound {
                requested: name.to_string(),
                available: wb.sheet_names(),
            }),
    }
}

/// Stored value at a coordinate, `Empty` when nothing is stored
pub fn cell_value<'a>(
    wb: &'a Workbook,
    sheet: Option<&str>,
    addr: CellAddress,
) -> Result<&'a CellValue, AccessError> {
    const EMPTY: &CellValue = &CellValue::Empty;
    if !addr.is_valid() {
        return Err(AccessError::InvalidAddress {
            row: addr.row,
            col: addr.col,
        });
    }
    let sheet = get_sheet(wb, sheet)?;
    Ok(sheet.cell_at(addr).map(|c| &c.value).unwrap_or(EMPTY))
}

/// One non-empty cell as seen by a reader
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CellView<'a> {
    pub address: CellAddress,
    /// Plain value, or the cached result for formula cells
    pub value: &'a CellValue,
    /// Formula text, when requested and present
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub formula: Option<&'a str>,
    /// Resolved style, when requested and not the default
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub style: Option<&'a Style>,
}

/// Iterate row-major over every non-empty cell of a sheet
///
/// The iterator is lazy; calling this again restarts from the first cell.
/// Cells that only carry a style are skipped.
pub fn iter_cells(
    sheet: &Worksheet,
    include_formulas: bool,
    include_style: bool,
) -> impl Iterator<Item = CellView<'_>> {
    sheet
        .iter_cells()
        .filter(|(_, data)| !data.value.is_empty())
        .map(move |(address, data)| CellView {
            address,
            value: data.value.effective_value(),
            formula: if include_formulas {
                data.value.formula_text()
            } else {
                None
            },
            style: if include_style && data.style_index != 0 {
                sheet.style_by_index(data.style_index)
            } else {
                None
            },
        })
}

/// Per-sheet overview
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SheetSummary {
    pub name: String,
    pub visibility: SheetVisibility,
    pub max_row: u32,
    pub max_column: u32,
    /// Cells holding a value
    pub cell_count: usize,
    pub formula_count: usize,
    pub chart_count: usize,
}

/// Summaries of every sheet, in workbook order
pub fn summarize(wb: &Workbook) -> Vec<SheetSummary> {
    wb.worksheets()
        .map(|ws| SheetSummary {
            name: ws.name().to_string(),
            visibility: ws.visibility(),
            max_row: ws.max_row(),
            max_column: ws.max_column(),
            cell_count: ws
                .iter_cells()
                .filter(|(_, data)| !data.value.is_empty())
                .count(),
            formula_count: ws.formula_cells().count(),
            chart_count: ws.charts().len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;
    use pretty_assertions::assert_eq;

    fn sample() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("B2", 2.0).unwrap();
        sheet.set_cell_value("A1", "head").unwrap();
        sheet
            .set_value_at(
                CellAddress::new(3, 1),
                CellValue::formula_with_cached("=B2*2", CellValue::Number(4.0)),
            )
            .unwrap();
        sheet
            .set_style_at(CellAddress::new(9, 9), &Style::new().bold(true))
            .unwrap();
        wb
    }

    #[test]
    fn test_get_sheet_unknown_lists_available() {
        let wb = sample();
        let err = get_sheet(&wb, Some("Missing")).unwrap_err();
        assert_eq!(
            err,
            AccessError::SheetNotFound {
                requested: "Missing".into(),
                available: vec!["Sheet1".into(), "Data".into()],
            }
        );
        assert_eq!(err.code(), "sheet_not_found");
    }

    #[test]
    fn test_get_sheet_defaults_to_active() {
        let mut wb = sample();
        assert_eq!(get_sheet(&wb, None).unwrap().name(), "Sheet1");
        wb.set_active_sheet(1).unwrap();
        assert_eq!(get_sheet(&wb, None).unwrap().name(), "Data");
        assert_eq!(get_sheet(&Workbook::empty(), None).unwrap_err(), AccessError::NoSheets);
    }

    #[test]
    fn test_iter_cells_row_major_without_extras() {
        let wb = sample();
        let sheet = get_sheet(&wb, Some("Sheet1")).unwrap();

        let views: Vec<_> = iter_cells(sheet, false, false).collect();
        let addrs: Vec<String> = views.iter().map(|v| v.address.to_string()).collect();
        assert_eq!(addrs, vec!["A1", "B2", "A3"]);
        assert!(views.iter().all(|v| v.formula.is_none() && v.style.is_none()));
        assert_eq!(views[2].value, &CellValue::Number(4.0));
    }

    #[test]
    fn test_iter_cells_with_formulas() {
        let wb = sample();
        let sheet = get_sheet(&wb, None).unwrap();
        let formulas: Vec<_> = iter_cells(sheet, true, true)
            .filter_map(|v| v.formula)
            .collect();
        assert_eq!(formulas, vec!["=B2*2"]);
    }

    #[test]
    fn test_empty_sheet_yields_nothing() {
        let wb = sample();
        let sheet = get_sheet(&wb, Some("Data")).unwrap();
        assert_eq!(iter_cells(sheet, true, true).count(), 0);
        assert_eq!((sheet.max_row(), sheet.max_column()), (0, 0));
    }

    #[test]
    fn test_cell_value_rejects_zero() {
        let wb = sample();
        assert_eq!(
            cell_value(&wb, None, CellAddress::new(0, 0)),
            Err(AccessError::InvalidAddress { row: 0, col: 0 })
        );
        assert_eq!(
            cell_value(&wb, None, CellAddress::new(50, 50)),
            Ok(&CellValue::Empty)
        );
    }

    #[test]
    fn test_summarize() {
        let wb = sample();
        let summary = summarize(&wb);
        assert_eq!(summary[0].cell_count, 3);
        assert_eq!(summary[0].formula_count, 1);
        assert_eq!(summary[0].max_row, 9);
        assert_eq!(summary[1].max_row, 0);
    }
}
