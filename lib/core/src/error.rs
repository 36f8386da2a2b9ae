use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classes shared by every AgroFlow crate.
///
/// Boundary layers translate these into protocol status codes; the
/// underlying error message is always kept alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    ServiceUnavailable,
    Internal,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CollectionNotFound(_) => ErrorKind::NotFound,
            Error::InvalidDimension { .. } => ErrorKind::InvalidInput,
            Error::InvalidConfig(_) => ErrorKind::ServiceUnavailable,
        }
    }
}
