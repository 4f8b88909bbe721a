/// Project task endpoints
///
/// - `GET /api/projects/:id/tasks`
/// - `POST /api/projects/:id/tasks` (appended at the end)
/// - `PUT /api/projects/:id/tasks` batch update `{ "tasks": [{ "id", ... }] }`
/// - `PUT /api/projects/:id/tasks/:task_id`
/// - `DELETE /api/projects/:id/tasks/:task_id`
///
/// Every task write also stamps the parent project's `updated_at` and
/// `last_edited_by`. The stamp runs in a savepoint of the task's transaction:
/// if it fails, the task change still commits and the failure is logged.

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
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitedesk_shared::models::{
    project::Project,
    project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask},
};
use sqlx::{Acquire, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub tasks: Vec<BatchTaskUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTaskUpdate {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateProjectTask,
}

#[derive(Debug, Serialize)]
pub struct BatchUpdateResponse {
    /// False when at least one task failed
    pub success: bool,
    pub tasks: Vec<ProjectTask>,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Serialize)]
pub struct BatchError {
    pub id: Uuid,
    pub message: String,
}

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// Stamps the project inside a savepoint of `tx`
///
/// Never fails: a failed stamp is rolled back to the savepoint and logged.
async fn touch_project(tx: &mut Transaction<'_, Postgres>, project_id: Uuid, editor: &str) {
    let mut savepoint = match (&mut *tx).begin().await {
        Ok(sp) => sp,
        Err(e) => {
            tracing::warn!(%project_id, error = %e, "Could not open savepoint for project stamp");
            return;
        }
    };

    match Project::touch(&mut *savepoint, project_id, editor).await {
        Ok(_) => {
            if let Err(e) = savepoint.commit().await {
                tracing::warn!(%project_id, error = %e, "Failed to release project stamp savepoint");
            }
        }
        Err(e) => {
            tracing::warn!(%project_id, error = %e, "Failed to stamp project after task change");
            if let Err(e) = savepoint.rollback().await {
                tracing::warn!(%project_id, error = %e, "Failed to roll back project stamp");
            }
        }
    }
}

/// Stamps the project outside any transaction, logging failures
async fn touch_project_detached(db: &PgPool, project_id: Uuid, editor: &str) {
    if let Err(e) = Project::touch(db, project_id, editor).await {
        tracing::warn!(%project_id, error = %e, "Failed to stamp project after batch update");
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    if Project::find_by_id(db, project_id).await?.is_none() {
        return Err(project_not_found());
    }

    Ok(Json(ProjectTask::list_by_project(db, project_id).await?).into_response())
}

pub async fn create_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(project_id): Path<Uuid>,
    Json(req): Json<NewTaskRequest>,
) -> ApiResult<Response> {
    let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return Err(ApiError::missing_fields(&["name"]));
    };
    let data = CreateProjectTask {
        name: name.to_string(),
        finished: req.finished,
    };

    let Some(db) = &state.db else {
        let (status, Json(mut record)) = stub::created(&data);
        record["projectId"] = json!(project_id);
        record["orderIndex"] = json!(0);
        return Ok((status, Json(record)).into_response());
    };

    let mut tx = db.begin().await?;

    if Project::find_by_id(&mut *tx, project_id).await?.is_none() {
        return Err(project_not_found());
    }

    let task = ProjectTask::create(&mut *tx, project_id, data).await?;
    touch_project(&mut tx, project_id, actor.display_name()).await;
    tx.commit().await?;

    tracing::debug!(%project_id, task_id = %task.id, order_index = task.order_index, "Task created");

    Ok((StatusCode::CREATED, Json(task)).into_response())
}

pub async fn update_task(
    State(state): State<AppState>,
    actor: Actor,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(changes): Json<UpdateProjectTask>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        let Json(mut record) = stub::updated(task_id, &changes);
        record["projectId"] = json!(project_id);
        return Ok(Json(record).into_response());
    };

    let mut tx = db.begin().await?;

    let task = ProjectTask::update(&mut *tx, project_id, task_id, changes)
        .await?
        .ok_or_else(task_not_found)?;
    touch_project(&mut tx, project_id, actor.display_name()).await;
    tx.commit().await?;

    Ok(Json(task).into_response())
}

/// Applies every update concurrently; failures are reported, not rolled back
pub async fn batch_update_tasks(
    State(state): State<AppState>,
    actor: Actor,
    Path(project_id): Path<Uuid>,
    Json(req): Json<BatchUpdateRequest>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(json!({ "success": true, "tasks": req.tasks })).into_response());
    };

    let results = join_all(req.tasks.into_iter().map(|item| async move {
        let outcome = ProjectTask::update(db, project_id, item.id, item.changes).await;
        (item.id, outcome)
    }))
    .await;

    let mut tasks = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (id, outcome) in results {
        match outcome {
            Ok(Some(task)) => tasks.push(task),
            Ok(None) => errors.push(BatchError {
                id,
                message: "Task not found".to_string(),
            }),
            Err(e) => {
                tracing::warn!(%project_id, task_id = %id, error = %e, "Batch task update failed");
                errors.push(BatchError {
                    id,
                    message: e.to_string(),
                });
            }
        }
    }

    if !tasks.is_empty() {
        touch_project_detached(db, project_id, actor.display_name()).await;
    }

    Ok(Json(BatchUpdateResponse {
        success: errors.is_empty(),
        tasks,
        errors,
    })
    .into_response())
}

pub async fn delete_task(
    State(state): State<AppState>,
    actor: Actor,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    let mut tx = db.begin().await?;

    if !ProjectTask::delete(&mut *tx, project_id, task_id).await? {
        return Err(task_not_found());
    }
    touch_project(&mut tx, project_id, actor.display_name()).await;
    tx.commit().await?;

    Ok(stub::success())
}
