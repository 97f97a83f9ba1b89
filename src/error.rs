use crate::types::call::ElevatorId;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Reasons a request is rejected. A rejected request leaves the system untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid call: {message}")]
    InvalidCall { message: String },

    #[error("unknown elevator: {0}")]
    UnknownElevator(ElevatorId),

    #[error("malformed request: {message}")]
    MalformedRequest { message: String },
}

impl DispatchError {
    pub fn invalid_call(message: impl Into<String>) -> Self {
        Self::InvalidCall {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
