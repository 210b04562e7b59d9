use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::registry::RegistryError;
use crate::upstream::UpstreamError;

/// Every way a gateway request can fail, and the response it turns into.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("not found")]
    NotFound,
    #[error("backend_unreachable")]
    UpstreamUnreachable,
    #[error("backend returned {status}")]
    Upstream { status: StatusCode, body: Value },
}

impl ApiError {
    pub fn missing(field: &str) -> Self {
        ApiError::Validation(format!("{field} is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
            ApiError::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Upstream { body, .. } => (status, Json(body)).into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(message) => ApiError::Validation(message),
            RegistryError::NotFound(_) => ApiError::NotFound,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unreachable { .. } => ApiError::UpstreamUnreachable,
            UpstreamError::Status { status, body } => ApiError::Upstream { status, body },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

/// Decode a request body that must be a JSON object. Arrays and scalars are
/// rejected even when they would fill the target struct positionally.
pub fn object_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = payload?;
    if !value.is_object() {
        return Err(ApiError::Validation("request body must be a JSON object".to_string()));
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("invalid query: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_fixed_error_bodies() {
        assert_eq!(
            render(ApiError::NotFound).await,
            (StatusCode::NOT_FOUND, json!({ "error": "not found" }))
        );
        assert_eq!(
            render(ApiError::UpstreamUnreachable).await,
            (StatusCode::BAD_GATEWAY, json!({ "error": "backend_unreachable" }))
        );
        assert_eq!(
            render(ApiError::missing("stream_id")).await,
            (StatusCode::BAD_REQUEST, json!({ "error": "stream_id is required" }))
        );
    }

    #[tokio::test]
    async fn test_upstream_body_relayed_verbatim() {
        let err = ApiError::from(UpstreamError::Status {
            status: StatusCode::CONFLICT,
            body: json!({ "error": "Failed to start stream", "code": 7 }),
        });
        assert_eq!(
            render(err).await,
            (StatusCode::CONFLICT, json!({ "error": "Failed to start stream", "code": 7 }))
        );
    }

    #[test]
    fn test_object_body_rejects_arrays_and_scalars() {
        use crate::types::CreateStreamRequest;

        let parsed: CreateStreamRequest =
            object_body(Ok(Json(json!({ "name": "Cam1", "url": "rtsp://host/1" })))).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Cam1"));

        for body in [json!(["Cam1", "rtsp://host/1"]), json!("Cam1"), json!(null)] {
            let result = object_body::<CreateStreamRequest>(Ok(Json(body)));
            assert!(matches!(result, Err(ApiError::Validation(_))));
        }

        let result = object_body::<CreateStreamRequest>(Ok(Json(json!({ "name": 5 }))));
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_registry_errors_map() {
        assert!(matches!(
            ApiError::from(RegistryError::NotFound("x".into())),
            ApiError::NotFound
        ));
        assert_eq!(
            ApiError::from(RegistryError::Validation("name is required".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
