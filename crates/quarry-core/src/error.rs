use thiserror::Error;

/// Canonical result for quarry.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Raised while building the API surface, before anything is served.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Type name collision: '{0}' is emitted with two different shapes")]
    Collision(String),

    /// Client-supplied filter/order arguments with the wrong shape.
    #[error("Invalid argument for '{field}': {reason}")]
    Argument { field: String, reason: String },

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Argument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
