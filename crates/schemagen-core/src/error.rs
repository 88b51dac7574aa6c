use thiserror::Error;

/// Core error type shared across schemagen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be read or converted.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by schemagen crates.
pub type Result<T> = std::result::Result<T, Error>;
