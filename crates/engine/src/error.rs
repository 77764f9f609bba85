use std::fmt;

/// Errors from the table view engine.
///
/// Filtering, sorting and paging never fail; these cover construction
/// mistakes and malformed input data.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Page size must be at least 1.
    InvalidPageSize(usize),
    /// Input data is not a JSON array of objects.
    Json(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPageSize(size) => {
                write!(f, "page size must be greater than zero, got {size}")
            }
            Self::Json(msg) => write!(f, "invalid record data: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
