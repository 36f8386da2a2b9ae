use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use agroflow_core::ErrorKind;

/// Failure surfaced to HTTP clients as `{"detail": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::InvalidInput => ApiError::BadRequest(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::ServiceUnavailable => ApiError::ServiceUnavailable(message),
            ErrorKind::Internal => ApiError::Internal(message),
        }
    }

    /// Missing model artifacts are a server fault, not a client one.
    pub fn prediction(e: agroflow_vision::Error) -> Self {
        let message = format!("Prediction error: {}", e);
        match e.kind() {
            ErrorKind::InvalidInput => ApiError::BadRequest(message),
            _ => ApiError::Internal(message),
        }
    }

    pub fn search(e: agroflow_rag::Error) -> Self {
        Self::from_kind(e.kind(), format!("Search error: {}", e))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "detail": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_prediction_mapping() {
        let bad = ApiError::prediction(agroflow_vision::Error::InvalidInput("empty".into()));
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let missing = ApiError::prediction(agroflow_vision::Error::NotFound {
            what: "Model",
            path: PathBuf::from("plant_disease/model.safetensors"),
        });
        assert_eq!(missing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(missing.to_string().contains("plant_disease/model.safetensors"));
    }

    #[test]
    fn test_search_mapping() {
        let unavailable = ApiError::search(agroflow_rag::Error::ServiceUnavailable("no key".into()));
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let missing = ApiError::search(agroflow_rag::Error::Store(
            agroflow_core::Error::CollectionNotFound("x".into()),
        ));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
