//! # sheetward-core
//!
//! In-memory workbook model for the sheetward spreadsheet engine.
//!
//! This crate provides the types every other sheetward crate builds on:
//! - [`CellValue`] - Cell contents (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - 1-based cell addressing and ranges
//! - [`Style`] - Cell formatting (font, fill, alignment, number format)
//! - [`Workbook`], [`Worksheet`] - The document structures
//! - [`Chart`] - Charts embedded in a worksheet
//! - [`access`] - Read-only queries over a workbook
//!
//! ## Example
//!
//! ```rust
//! use sheetward_core::{CellAddress, CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet
//!     .set_value_at(CellAddress::new(2, 1), CellValue::Number(3.5))
//!     .unwrap();
//!
//! assert_eq!(sheet.max_row(), 2);
//! assert_eq!(sheet.max_column(), 1);
//! ```

pub mod access;
pub mod cell;
pub mod chart;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use access::{CellView, SheetSummary};
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use chart::{Chart, ChartAnchor, ChartKind, DataReference, DataSeries};
pub use error::{AccessError, Error, Result};
pub use workbook::{MacroArchive, SheetVisibility, Workbook};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style, StylePool,
    Underline, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
