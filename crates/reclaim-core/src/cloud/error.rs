use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CloudError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{op} '{target}' failed: {reason}")]
    Request {
        op: &'static str,
        target: String,
        reason: String,
    },
}

impl CloudError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CloudError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn request(op: &'static str, target: impl Into<String>, reason: impl Into<String>) -> Self {
        CloudError::Request {
            op,
            target: target.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }
}

pub type CloudResult<T> = Result<T, CloudError>;
