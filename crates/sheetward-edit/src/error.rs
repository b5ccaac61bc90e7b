//! Error types for the mutation engine

use sheetward_core::AccessError;
use thiserror::Error;

/// Result type for a single edit
pub type EditResult<T> = std::result::Result<T, EditError>;

/// Why an operation (or a whole batch) could not be applied
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// The batch itself is unreadable
    #[error("operation list must be a JSON array: {0}")]
    InvalidBatch(String),

    /// A batch element that did not decode into an operation
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    /// Address or sheet-limit violation reported by the model
    #[error(transparent)]
    Model(#[from] sheetward_core::Error),

    /// An operation that needs values received none
    #[error("{kind} requires at least one value")]
    EmptyValues { kind: &'static str },

    #[error("formula text is empty")]
    EmptyFormula,

    #[error("invalid color '{0}' (expected RRGGBB or AARRGGBB)")]
    InvalidColor(String),

    #[error("invalid style: {0}")]
    InvalidStyle(String),
}

impl EditError {
    /// Stable identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            EditError::InvalidBatch(_) => "invalid_batch",
            EditError::InvalidOperation(_) => "invalid_operation",
            EditError::Access(e) => e.code(),
            EditError::Model(e) => e.code(),
            EditError::EmptyValues { .. } => "empty_values",
            EditError::EmptyFormula => "empty_formula",
            EditError::InvalidColor(_) => "invalid_color",
            EditError::InvalidStyle(_) => "invalid_style",
        }
    }
}
