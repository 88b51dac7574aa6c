use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("unique generator '{generator}' exhausted after {attempts} attempts")]
    UniqueExhausted { generator: String, attempts: u64 },
    #[error("generator '{generator}' failed: {message}")]
    Generator { generator: String, message: String },
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error(transparent)]
    Core(#[from] schemagen_core::Error),
}
