use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::types::{
    CreateStreamRequest, DeleteStreamQuery, RemovedResponse, RenameStreamRequest,
    StreamListResponse, StreamResponse,
};
use crate::web::{
    error::{object_body, ApiError},
    SharedState,
};
use serde_json::Value;

pub async fn list_streams(State(state): State<SharedState>) -> Json<StreamListResponse> {
    Json(StreamListResponse {
        streams: state.registry.list().await,
    })
}

pub async fn create_stream(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StreamResponse>), ApiError> {
    let request: CreateStreamRequest = object_body(payload)?;
    let stream = state
        .registry
        .create(
            request.name.as_deref().unwrap_or_default(),
            request.url.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(StreamResponse { stream })))
}

pub async fn rename_stream(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StreamResponse>, ApiError> {
    let request: RenameStreamRequest = object_body(payload)?;
    let id = request
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing("id"))?;

    let stream = state
        .registry
        .rename(id, request.name.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(StreamResponse { stream }))
}

pub async fn delete_stream(
    State(state): State<SharedState>,
    query: Result<Query<DeleteStreamQuery>, QueryRejection>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let Query(query) = query?;
    let id = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing("id"))?;

    let removed = state.registry.delete(id).await?;
    Ok(Json(RemovedResponse { removed }))
}
