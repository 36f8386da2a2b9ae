use agroflow_core::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(
        "Embedding dimension mismatch for collection '{collection}': expected {expected}, provider returned {actual}"
    )]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read embeddings source {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] agroflow_core::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ServiceUnavailable(_) | Error::DimensionMismatch { .. } => {
                ErrorKind::ServiceUnavailable
            }
            Error::Store(e) => e.kind(),
            Error::Source { .. } => ErrorKind::Internal,
        }
    }
}
