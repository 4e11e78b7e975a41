use crate::client::ClientError;

/// Where a failed mutation should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Non-blocking notification.
    Toast,
    /// Message next to the control that triggered the mutation.
    Inline,
    /// Nothing to show (the owning view went away).
    Silent,
}

/// Failure of a mutation after rollback. Views only ever see this type,
/// never raw transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Validation { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("request was not applied: {0}")]
    Rejected(String),
    #[error("mutation cancelled")]
    Cancelled,
}

impl MutationError {
    pub fn surface(&self) -> Surface {
        match self {
            MutationError::Network(_) | MutationError::Decode(_) | MutationError::Rejected(_) => {
                Surface::Toast
            }
            MutationError::Validation { .. } => Surface::Inline,
            MutationError::Cancelled => Surface::Silent,
        }
    }
}

impl From<ClientError> for MutationError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(msg) => MutationError::Network(msg),
            ClientError::Validation { status, message } => {
                MutationError::Validation { status, message }
            }
            // The controller settles these as success before converting.
            ClientError::AlreadyInDesiredState(message) => MutationError::Validation {
                status: 409,
                message,
            },
            ClientError::Decode(msg) => MutationError::Decode(msg),
        }
    }
}

impl From<serde_json::Error> for MutationError {
    fn from(err: serde_json::Error) -> Self {
        MutationError::Decode(err.to_string())
    }
}
