/// Database error type shared by the connectors in this crate.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Error reported by the MongoDB driver
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Connection could not be verified (server unreachable, auth failure, ...)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    /// Whether retrying the same operation can succeed.
    ///
    /// Bad configuration (e.g. an unparseable connection string) never heals on its own.
    pub fn is_transient(&self) -> bool {
        !matches!(self, DatabaseError::ConfigError(_))
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
