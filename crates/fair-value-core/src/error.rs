use thiserror::Error;

#[derive(Debug, Error)]
pub enum FairValueError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unsupported method: {method} is not implemented")]
    UnsupportedMethod { method: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FairValueError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FairValueError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FairValueError {
    fn from(e: serde_json::Error) -> Self {
        FairValueError::SerializationError(e.to_string())
    }
}
