use thiserror::Error;

/// Broad classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source missing or unreadable. Recoverable on the next reload.
    SourceUnavailable,
    /// A single row could not be mapped and was dropped.
    RowMappingFailure,
    /// Query is missing a field its mode requires, or a field is out of range.
    ValidationError,
    /// A non-finite coordinate reached the distance computation.
    GeoInputError,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("row dropped: missing required field {field}")]
    RowMapping { field: &'static str },

    #[error("invalid search query: {0}")]
    Validation(String),

    #[error("{field} must be a finite number, got {value}")]
    GeoInput { field: &'static str, value: f64 },
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            EngineError::RowMapping { .. } => ErrorKind::RowMappingFailure,
            EngineError::Validation(_) => ErrorKind::ValidationError,
            EngineError::GeoInput { .. } => ErrorKind::GeoInputError,
        }
    }
}
