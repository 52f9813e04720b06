use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid runner name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid protected name hash: {0} (expected 32 hex characters)")]
    InvalidHash(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
