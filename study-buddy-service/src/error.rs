//! Mapping of handler failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use study_buddy_types::ErrorResponse;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Request passed extraction but is still unusable.
    Validation(String),
    /// Request body could not be read; carries the status the extractor chose.
    Rejected(StatusCode, String),
    /// Storage failed; clients only see an opaque 500.
    Store(StoreError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Rejected(status, msg) => {
                write!(f, "Rejected request ({}): {}", status, msg)
            }
            ApiError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Store(StoreError::Serialization(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Rejected(status, msg) => (status, msg),
            ApiError::Store(e) => {
                log::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_reports_detail() {
        let resp = ApiError::Validation("file is required".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(resp).await, json!({"detail": "file is required"}));
    }

    #[tokio::test]
    async fn test_store_error_is_opaque() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone at /var/data");
        let resp = ApiError::from(StoreError::from(io)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({"detail": "Internal Server Error"})
        );
    }

    #[tokio::test]
    async fn test_rejected_keeps_status() {
        let rejected = ApiError::Rejected(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string());
        let resp = rejected.into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(resp).await, json!({"detail": "too big"}));
    }
}
