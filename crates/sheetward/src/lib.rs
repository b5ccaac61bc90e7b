//! # sheetward
//!
//! Decode, inspect, edit, chart and scan XLSX workbooks without touching the
//! filesystem. Every entry point takes and returns byte buffers; reading
//! and writing files is left to the caller.
//!
//! ## Components
//!
//! - Container codec: [`decode`], [`encode`]
//! - Read access: [`access`]
//! - Batch edits: [`apply`], [`parse_operations`]
//! - Charts: [`add_chart`], [`ChartSpec`]
//! - Security scan: [`SecurityScanner`], [`ScanConfig`]
//!
//! ## Example
//!
//! ```rust
//! use sheetward::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Month").unwrap();
//! sheet.set_cell_value("B1", "Revenue").unwrap();
//! sheet.set_cell_value("A2", "Jan").unwrap();
//! sheet.set_cell_value("B2", 1200.0).unwrap();
//!
//! let bytes = workbook.to_xlsx_bytes().unwrap();
//! let (edited, report) = sheetward::edit_bytes(
//!     &bytes,
//!     r#"[{"kind": "append_row", "sheet": "Sheet1", "values": ["Feb", 1350]}]"#,
//! )
//! .unwrap();
//! assert_eq!(report.summary(), "1 of 1 operations succeeded");
//!
//! let scan = sheetward::scan_bytes(&edited, &ScanConfig::default()).unwrap();
//! assert_eq!(scan.risk_level, RiskLevel::Low);
//! ```

pub mod prelude;

use log::debug;
use thiserror::Error;

pub use sheetward_core::{
    access, AccessError, Alignment, CellAddress, CellData, CellError, CellRange, CellValue,
    CellView, Chart, ChartAnchor, ChartKind, Color, DataReference, DataSeries, FillStyle,
    FontStyle, HorizontalAlignment, MacroArchive, NumberFormat, SheetSummary, SheetVisibility,
    Style, StylePool, Underline, VerticalAlignment, Workbook, Worksheet, MAX_COLS, MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

/// Errors from the workbook model (addresses, sheet names)
pub use sheetward_core::Error as ModelError;

pub use sheetward_chart::{add_chart, build_chart, ChartError, ChartSpec};
pub use sheetward_edit::{
    apply, apply_operation, apply_records, parse_operations, CellInput, EditError,
    MutationReport, Operation, OperationOutcome, OperationRecord, OperationStatus, StylePatch,
};
pub use sheetward_scan::{
    CheckId, FindingStatus, RiskLevel, ScanConfig, ScanReport, SecurityFinding, SecurityScanner,
    MAX_FINDING_DETAILS,
};
pub use sheetward_xlsx::{
    decode, decode_with_options, encode, CodecError, DecodeOptions, XlsxReader, XlsxWriter,
    DEFAULT_MAX_CELLS,
};

/// Any failure raised by the byte-level helpers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    /// Stable identifier of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            Error::Codec(e) => e.code(),
            Error::Access(e) => e.code(),
            Error::Chart(e) => e.code(),
            Error::Edit(e) => e.code(),
            Error::Model(e) => e.code(),
        }
    }
}

/// Result type for the byte-level helpers
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait wiring the components onto [`Workbook`]
pub trait WorkbookExt: Sized {
    /// Decode package bytes, discarding any macro project
    fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self>;

    /// Encode to package bytes
    fn to_xlsx_bytes(&self) -> Result<Vec<u8>>;

    /// Apply a batch of operations in order
    fn apply_operations(&mut self, ops: &[Operation]) -> MutationReport;

    /// Attach a chart built from `spec`
    fn insert_chart(&mut self, spec: ChartSpec) -> Result<()>;

    /// Run the security checks selected by `config`
    fn scan(&self, config: &ScanConfig) -> ScanReport;
}

impl WorkbookExt for Workbook {
    fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(decode(bytes, false)?)
    }

    fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode(self)?)
    }

    fn apply_operations(&mut self, ops: &[Operation]) -> MutationReport {
        apply(self, ops)
    }

    fn insert_chart(&mut self, spec: ChartSpec) -> Result<()> {
        Ok(add_chart(self, spec)?)
    }

    fn scan(&self, config: &ScanConfig) -> ScanReport {
        SecurityScanner::new(config.clone()).scan(self)
    }
}

/// Decode package bytes without keeping the macro project
pub fn open_bytes(bytes: &[u8]) -> Result<Workbook> {
    Workbook::from_xlsx_bytes(bytes)
}

/// Encode a workbook into package bytes
pub fn save_bytes(workbook: &Workbook) -> Result<Vec<u8>> {
    workbook.to_xlsx_bytes()
}

/// Decode and scan
///
/// The macro project is only kept in memory when the macro check is enabled.
pub fn scan_bytes(bytes: &[u8], config: &ScanConfig) -> Result<ScanReport> {
    let preserve_macros = config.is_enabled(CheckId::MacroCheck);
    let workbook = decode(bytes, preserve_macros)?;
    Ok(workbook.scan(config))
}

/// Decode, apply a JSON operation batch and re-encode
///
/// The macro project is carried through unchanged. Individual operation
/// failures are reported in the [`MutationReport`]; only unreadable input or
/// output fails the call.
pub fn edit_bytes(bytes: &[u8], ops_json: &str) -> Result<(Vec<u8>, MutationReport)> {
    let records = parse_operations(ops_json)?;
    let mut workbook = decode(bytes, true)?;
    let report = apply_records(&mut workbook, &records);
    debug!("edit batch: {}", report.summary());
    Ok((encode(&workbook)?, report))
}

/// Decode, add one chart and re-encode
pub fn chart_bytes(bytes: &[u8], spec: ChartSpec) -> Result<Vec<u8>> {
    let mut workbook = decode(bytes, true)?;
    workbook.insert_chart(spec)?;
    Ok(encode(&workbook)?)
}
