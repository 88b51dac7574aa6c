mod config;
mod logging;

pub use config::{CliConfig, GenerateFlags, load_config};
pub use logging::{init_file_logging, init_stderr_logging};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("config file not found: {0}")]
    MissingConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
