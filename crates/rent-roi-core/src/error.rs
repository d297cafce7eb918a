use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentRoiError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RentRoiError {
    fn from(e: serde_json::Error) -> Self {
        RentRoiError::SerializationError(e.to_string())
    }
}

impl RentRoiError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        RentRoiError::Overflow {
            context: context.into(),
        }
    }
}
