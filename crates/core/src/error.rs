#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Session expired or not found")]
    SessionExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}
