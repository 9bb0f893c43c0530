use thiserror::Error;

/// Caller-supplied filter or update data that cannot be turned into SQL.
///
/// Every variant is a client-side mistake and maps to a 400 at the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("No data")]
    EmptyUpdate,

    #[error("Update data must be a JSON object")]
    NotAnObject,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' cannot be changed")]
    ReadOnlyField(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),

    #[error("{0} must be 0 or greater")]
    Negative(&'static str),

    #[error("{max} must be greater than or equal to {min}")]
    InvertedRange { min: &'static str, max: &'static str },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
