pub mod error;
pub mod rest;

pub use error::ApiError;
pub use rest::{AppState, RestApi, DEFAULT_MAX_UPLOAD_BYTES, UPLOAD_FIELD};
