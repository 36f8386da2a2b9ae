use agroflow_core::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{what} file not found: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Failed to load {what} from {}: {reason}", .path.display())]
    ArtifactLoad {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Inference error: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn load(what: &'static str, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ArtifactLoad {
            what,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidInput(_) | Error::Decode(_) => ErrorKind::InvalidInput,
            Error::ArtifactLoad { .. }
            | Error::InvalidArtifact(_)
            | Error::Inference(_)
            | Error::Io(_) => ErrorKind::Internal,
        }
    }
}
