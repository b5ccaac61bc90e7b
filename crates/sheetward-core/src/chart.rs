//! Charts embedded in a worksheet
//!
//! A chart never copies data. Every series points back at cells through a
//! [`DataReference`] such as `'Sales Data'!$B$2:$B$5`.

use crate::cell::{CellAddress, CellRange};
use std::fmt;

/// Supported chart families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChartKind {
    /// Vertical bars (column chart)
    Bar,
    Line,
    Pie,
    /// XY scatter, the first column supplies X values
    Scatter,
}

impl ChartKind {
    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
        }
    }

    /// Parse a lower-case name, accepting "column" for bar
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" | "column" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "pie" => Some(ChartKind::Pie),
            "scatter" | "xy" => Some(ChartKind::Scatter),
            _ => None,
        }
    }

    /// Whether the chart draws axes
    pub fn has_axes(&self) -> bool {
        !matches!(self, ChartKind::Pie)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sheet-qualified, absolute cell reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataReference {
    pub sheet: String,
    pub range: CellRange,
}

impl DataReference {
    pub fn new<S: Into<String>>(sheet: S, range: CellRange) -> Self {
        Self {
            sheet: sheet.into(),
            range,
        }
    }

    /// Reference to a single cell
    pub fn cell<S: Into<String>>(sheet: S, addr: CellAddress) -> Self {
        Self::new(sheet, CellRange::single(addr))
    }

    /// Formula text, e.g. `'Sales Data'!$B$2:$B$5` or `Data!$A$1`
    pub fn formula(&self) -> String {
        let range = if self.range.is_single_cell() {
            self.range.start.to_absolute_string()
        } else {
            self.range.to_absolute_string()
        };
        format!("{}!{}", quote_sheet_name(&self.sheet), range)
    }

    /// Parse formula text produced by [`DataReference::formula`] or a spreadsheet
    /// application. Anything other than `Sheet!Range` yields `None`.
    pub fn parse(formula: &str) -> Option<Self> {
        let formula = formula.trim().trim_start_matches('=');
        let (sheet, range) = formula.rsplit_once('!')?;
        let sheet = if let Some(quoted) = sheet.strip_prefix('\'') {
            quoted.strip_suffix('\'')?.replace("''", "'")
        } else {
            sheet.to_string()
        };
        if sheet.is_empty() {
            return None;
        }
        let range = CellRange::parse(range).ok()?;
        Some(Self { sheet, range })
    }
}

impl fmt::Display for DataReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula())
    }
}

/// Quote a sheet name for use in a formula when it is not a plain identifier
pub fn quote_sheet_name(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    // Names like "A1" or "R1C1" would read as cell references
    let looks_like_ref = CellAddress::parse(name).is_ok();
    if plain && !looks_like_ref {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSeries {
    /// Cell holding the series name
    pub name: Option<DataReference>,
    /// Category labels, or X values for scatter charts
    pub categories: Option<DataReference>,
    pub values: DataReference,
}

/// Cell rectangle a chart is drawn over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartAnchor {
    /// Top-left cell
    pub from: CellAddress,
    /// Cell the bottom-right corner reaches
    pub to: CellAddress,
}

impl ChartAnchor {
    /// Footprint used when none is given: 8 columns by 15 rows
    pub const DEFAULT_SIZE: (u32, u32) = (8, 15);

    /// Anchor spanning `cols` columns and `rows` rows from `from`
    ///
    /// The far corner saturates at the sheet limits.
    pub fn with_size(from: CellAddress, cols: u32, rows: u32) -> Self {
        let to = CellAddress::new(
            from.row.saturating_add(rows).min(crate::MAX_ROWS),
            from.col.saturating_add(cols).min(crate::MAX_COLS),
        );
        Self { from, to }
    }
}

/// A chart owned by a worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
    pub series: Vec<DataSeries>,
    pub anchor: ChartAnchor,
}

impl Chart {
    /// Create an empty chart of the given kind
    pub fn new(kind: ChartKind, anchor: ChartAnchor) -> Self {
        Self {
            kind,
            title: None,
            x_axis_title: None,
            y_axis_title: None,
            series: Vec::new(),
            anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_formula_quotes_when_needed() {
        let range = CellRange::parse("B2:B5").unwrap();
        assert_eq!(
            DataReference::new("Sales Data", range).formula(),
            "'Sales Data'!$B$2:$B$5"
        );
        assert_eq!(DataReference::new("Data", range).formula(), "Data!$B$2:$B$5");
        assert_eq!(DataReference::new("A1", range).formula(), "'A1'!$B$2:$B$5");
        assert_eq!(
            DataReference::cell("Bob's", CellAddress::new(1, 2)).formula(),
            "'Bob''s'!$B$1"
        );
    }

    #[test]
    fn test_reference_parse() {
        let parsed = DataReference::parse("'Bob''s Sheet'!$A$2:$A$9").unwrap();
        assert_eq!(parsed.sheet, "Bob's Sheet");
        assert_eq!(parsed.range, CellRange::parse("A2:A9").unwrap());

        let parsed = DataReference::parse("Data!C3").unwrap();
        assert!(parsed.range.is_single_cell());

        assert_eq!(DataReference::parse("$A$1:$A$3"), None);
        assert_eq!(DataReference::parse("Data!nonsense"), None);
    }

    #[test]
    fn test_anchor_with_size() {
        let anchor = ChartAnchor::with_size(CellAddress::new(2, 5), 8, 15);
        assert_eq!(anchor.to, CellAddress::new(17, 13));

        let edge = ChartAnchor::with_size(CellAddress::new(crate::MAX_ROWS, 1), 8, 15);
        assert_eq!(edge.to.row, crate::MAX_ROWS);
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!(ChartKind::parse("Column"), Some(ChartKind::Bar));
        assert_eq!(ChartKind::parse("scatter"), Some(ChartKind::Scatter));
        assert_eq!(ChartKind::parse("radar"), None);
        assert!(!ChartKind::Pie.has_axes());
    }
}
