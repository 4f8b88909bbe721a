/// Project endpoints
///
/// Reads include the project's tasks in display order. Writes stamp
/// `last_edited_by` with the caller's name.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use sitedesk_shared::models::project::{Project, ProjectInput, DEFAULT_STATUS};
use uuid::Uuid;

fn not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    Ok(Json(Project::list_with_tasks(db).await?).into_response())
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    let project = Project::find_with_tasks(db, id).await?.ok_or_else(not_found)?;
    Ok(Json(project).into_response())
}

pub async fn create_project(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut input): Json<ProjectInput>,
) -> ApiResult<Response> {
    input.name = input.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if input.name.is_none() {
        return Err(ApiError::missing_fields(&["name"]));
    }

    let Some(db) = &state.db else {
        if input.status.is_none() {
            input.status = Some(DEFAULT_STATUS.to_string());
        }
        let (status, Json(mut record)) = stub::created(&input);
        record["lastEditedBy"] = json!(actor.display_name());
        record["tasks"] = json!([]);
        return Ok((status, Json(record)).into_response());
    };

    let project = Project::create(db, input, actor.display_name()).await?;
    tracing::info!(project_id = %project.id, name = %project.name, "Project created");

    Ok((StatusCode::CREATED, Json(project)).into_response())
}

pub async fn update_project(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(input): Json<ProjectInput>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        let Json(mut record) = stub::updated(id, &input);
        record["lastEditedBy"] = json!(actor.display_name());
        return Ok(Json(record).into_response());
    };

    let project = Project::update(db, id, input, actor.display_name())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(project).into_response())
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    if !Project::delete(db, id).await? {
        return Err(not_found());
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(stub::success())
}
