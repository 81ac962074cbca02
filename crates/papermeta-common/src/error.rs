use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PapermetaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}. Use json, xml or txt")]
    UnsupportedFormat(String),

    #[error("Metadata not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

pub type Result<T> = std::result::Result<T, PapermetaError>;

/// Error returned by HTTP handlers. Rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_)   => StatusCode::NOT_FOUND,
            ApiError::Internal(_)   => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PapermetaError> for ApiError {
    fn from(err: PapermetaError) -> Self {
        match err {
            PapermetaError::InvalidInput(_) | PapermetaError::UnsupportedFormat(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PapermetaError::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let e: ApiError = PapermetaError::InvalidInput("only PDF files are supported".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);

        let e: ApiError = PapermetaError::UnsupportedFormat("yaml".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("yaml"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let e: ApiError = PapermetaError::NotFound("abc".into()).into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_and_extraction_map_to_500() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let e: ApiError = PapermetaError::from(io).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.to_string().contains("read-only"));

        let e: ApiError = PapermetaError::Extraction("empty text".into()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_and_export_failures_map_to_500() {
        let e: ApiError = PapermetaError::Duplicate("abc".into()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.to_string(), "Duplicate record: abc");

        let e: ApiError = PapermetaError::Export("bad xml".into()).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: ApiError = PapermetaError::from(json).into();
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.to_string().starts_with("Serialization error"));
    }
}
