//! XLSX error types

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors raised while decoding or encoding a package
///
/// Every variant is fatal to the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The bytes are not a readable package, or a required part is missing or malformed
    #[error("corrupt container: {0}")]
    CorruptContainer(String),

    /// A recognizable document that is not an XML spreadsheet package
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document holds more non-empty cells than the configured ceiling
    #[error("document exceeds the limit of {limit} non-empty cells")]
    TooManyCells { limit: usize },

    /// The workbook could not be written
    #[error("failed to encode workbook: {0}")]
    EncodeFailure(String),
}

impl CodecError {
    /// Stable identifier for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::CorruptContainer(_) => "corrupt_container",
            CodecError::UnsupportedFormat(_) => "unsupported_format",
            CodecError::TooManyCells { .. } => "too_many_cells",
            CodecError::EncodeFailure(_) => "encode_failure",
        }
    }

    pub(crate) fn corrupt<S: Into<String>>(message: S) -> Self {
        CodecError::CorruptContainer(message.into())
    }

    /// Malformed XML inside a named part
    pub(crate) fn malformed_xml(part: &str, err: quick_xml::Error) -> Self {
        CodecError::CorruptContainer(format!("malformed XML in {}: {}", part, err))
    }
}

impl From<zip::result::ZipError> for CodecError {
    fn from(err: zip::result::ZipError) -> Self {
        CodecError::EncodeFailure(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::EncodeFailure(err.to_string())
    }
}
