use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanVerifyError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Configuration error: {field} — {reason}")]
    Configuration { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Loan service error: {endpoint} — {reason}")]
    Collaborator { endpoint: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanVerifyError {
    fn from(e: serde_json::Error) -> Self {
        LoanVerifyError::SerializationError(e.to_string())
    }
}
