use thiserror::Error;

/// Errors from repository operations (used by trait definitions in shurahub-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised while delivering a frame to the client.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The transport reported closed; no further sends may be attempted.
    #[error("client transport closed")]
    Closed,

    #[error("failed to encode frame: {0}")]
    Encode(String),
}

/// Reasons a debate run stops before producing a record.
///
/// Provider failures never appear here: the gateway absorbs them.
#[derive(Debug, Error)]
pub enum DebateError {
    #[error("client disconnected")]
    Disconnected,

    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl From<SinkError> for DebateError {
    fn from(e: SinkError) -> Self {
        match e {
            SinkError::Closed => DebateError::Disconnected,
            SinkError::Encode(msg) => DebateError::Encode(msg),
        }
    }
}

/// Errors from resolving a session token into an account.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("session token rejected: {0}")]
    InvalidToken(String),

    #[error("session token has no subject")]
    MissingSubject,
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("model pool is empty")]
    EmptyModelPool,

    #[error("missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}
