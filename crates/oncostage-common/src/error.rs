use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OncostageError {
    #[error("Could not open/read file {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl OncostageError {
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OncostageError::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OncostageError>;
