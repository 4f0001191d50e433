#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Session storage is marked as immutable")]
    ImmutableStorage,

    #[error("Session validation failed")]
    ValidationFailed,

    #[error("Save handler error: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl SessionError {
    pub(crate) fn backend(err: anyhow::Error) -> Self {
        SessionError::Backend(err)
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
