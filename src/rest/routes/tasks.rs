// rest/routes/tasks.rs — Task CRUD routes.
//
// One request = one store operation; no cross-request state. Store failures
// are reported as `{"error": message}` with the status picked by taxonomy:
// validation 400, unknown id 404, infrastructure 500. A failed request never
// takes the server down.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::storage::{NewTask, StoreError, TaskPatch, TaskRow};
use crate::AppContext;

type ErrorResponse = (StatusCode, Json<Value>);

fn error_response(err: StoreError) -> ErrorResponse {
    let status = match err {
        StoreError::EmptyTitle => StatusCode::BAD_REQUEST,
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(err = %err, "task store failure");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Vec<TaskRow>>, ErrorResponse> {
    ctx.storage
        .list_tasks()
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewTask>,
) -> Result<Json<TaskRow>, ErrorResponse> {
    ctx.storage
        .create_task(body)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskRow>, ErrorResponse> {
    ctx.storage
        .update_task(&id, patch)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Idempotent-in-effect: deleting an absent id still answers 200 with the
/// same body shape.
pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    ctx.storage
        .delete_task(&id)
        .await
        .map_err(error_response)?;
    Ok(Json(json!({ "message": "task deleted", "id": id })))
}
