use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresalesError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Malformed input at record {index}: {field} — {reason}")]
    MalformedInput {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PresalesError {
    pub(crate) fn invalid_parameter(field: &str, reason: impl Into<String>) -> Self {
        PresalesError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(index: usize, field: &str, reason: impl Into<String>) -> Self {
        PresalesError::MalformedInput {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PresalesError {
    fn from(e: serde_json::Error) -> Self {
        PresalesError::SerializationError(e.to_string())
    }
}
