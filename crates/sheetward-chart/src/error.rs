//! Error types for chart embedding

use thiserror::Error;

/// Result type for chart operations
pub type ChartResult<T> = std::result::Result<T, ChartError>;

/// Reasons an [`add_chart`](crate::add_chart) call is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// The data range cannot feed a chart
    #[error("invalid chart range {range}: {reason}")]
    InvalidRange { range: String, reason: String },

    /// The target sheet does not exist
    #[error("sheet '{requested}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// The anchor cell lies outside the sheet
    #[error("chart anchor (row {row}, column {col}) is outside the sheet")]
    AnchorOutOfBounds { row: u32, col: u32 },
}

impl ChartError {
    pub(crate) fn invalid_range(range: impl ToString, reason: impl Into<String>) -> Self {
        ChartError::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            ChartError::InvalidRange { .. } => "invalid_range",
            ChartError::SheetNotFound { .. } => "sheet_not_found",
            ChartError::AnchorOutOfBounds { .. } => "anchor_out_of_bounds",
        }
    }
}
