/// Errors from external identifier index operations.
#[derive(Debug, thiserror::Error)]
pub enum ExtIdError {
    /// A network/timeout class failure talking to the index backend.
    #[error("transient index error: {0}")]
    Transient(String),

    /// An identifier scheme tag was empty or malformed.
    #[error("invalid scheme: {0}")]
    InvalidScheme(String),
}

/// Result alias for index operations.
pub type ExtIdResult<T> = Result<T, ExtIdError>;
