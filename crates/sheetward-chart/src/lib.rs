//! # sheetward-chart
//!
//! Chart embedding for sheetward.
//!
//! A [`ChartSpec`] names a rectangle of cells whose first row is a header and
//! whose first column holds categories. [`add_chart`] turns it into a
//! [`Chart`] whose series reference those cells and appends it to the sheet.

mod embed;
mod error;

pub use embed::{add_chart, build_chart, ChartSpec};
pub use error::{ChartError, ChartResult};

pub use sheetward_core::{Chart, ChartAnchor, ChartKind, DataReference, DataSeries};
