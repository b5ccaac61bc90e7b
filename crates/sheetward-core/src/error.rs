//! Error types for sheetward-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or modifying the workbook model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Address text that is not valid A1 notation
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Range text that is not valid A1 range notation
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row outside 1..=MAX_ROWS
    #[error("Row {0} out of bounds (valid: 1..={1})")]
    RowOutOfBounds(u32, u32),

    /// Column outside 1..=MAX_COLS
    #[error("Column {0} out of bounds (valid: 1..={1})")]
    ColumnOutOfBounds(u32, u32),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Stable identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidAddress(_) => "invalid_address",
            Error::InvalidRange(_) => "invalid_range",
            Error::RowOutOfBounds(..) | Error::ColumnOutOfBounds(..) => "address_out_of_bounds",
            Error::SheetOutOfBounds(..) => "sheet_out_of_bounds",
            Error::InvalidSheetName(_) => "invalid_sheet_name",
            Error::DuplicateSheetName(_) => "duplicate_sheet_name",
            Error::Other(_) => "other",
        }
    }
}

/// Errors returned by the read accessors in [`crate::access`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The requested sheet does not exist
    #[error("sheet '{requested}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// The workbook has no sheets at all
    #[error("workbook contains no sheets")]
    NoSheets,

    /// A coordinate below 1 or beyond the sheet limits
    #[error("invalid cell address (row {row}, column {col})")]
    InvalidAddress { row: u32, col: u32 },
}

impl AccessError {
    /// Stable identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::SheetNotFound { .. } => "sheet_not_found",
            AccessError::NoSheets => "no_sheets",
            AccessError::InvalidAddress { .. } => "invalid_address",
        }
    }
}
