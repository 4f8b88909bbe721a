/// Task reminder endpoints
///
/// - `GET /api/task-reminders?userId=&position=` reminders visible to a user
/// - `POST /api/task-reminders` create, with optional `userIds` / `positions` tags
/// - `GET /api/task-reminders/:id` reminder with project, creator, tags, completions
/// - `PUT /api/task-reminders/:id` creator only; tag lists replace all tags
/// - `DELETE /api/task-reminders/:id` creator only
///
/// Anonymous callers pass the creator check only while
/// `REMINDER_ANONYMOUS_WRITES` is on.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitedesk_shared::models::{
    de,
    reminder_tag::{self, TagTarget},
    task_reminder::{TaskReminder, TaskReminderInput, DEFAULT_PRIORITY, DEFAULT_STATUS},
};
use sqlx::{Acquire, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityQuery {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Reminder body for create and update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    #[serde(flatten)]
    pub fields: TaskReminderInput,

    /// Users to tag; on update, present lists replace every tag
    #[serde(default)]
    pub user_ids: Option<Vec<Uuid>>,

    /// Positions to tag
    #[serde(default)]
    pub positions: Option<Vec<String>>,

    /// Creator when the caller has no identity of its own
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub created_by: Option<Uuid>,
}

impl ReminderRequest {
    /// Tag targets, or `None` when neither list was sent
    pub fn tag_targets(&self) -> Option<Vec<TagTarget>> {
        if self.user_ids.is_none() && self.positions.is_none() {
            return None;
        }

        Some(TagTarget::from_lists(
            self.user_ids.as_deref().unwrap_or_default(),
            self.positions.as_deref().unwrap_or_default(),
        ))
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Task reminder not found".to_string())
}

/// Swaps the reminder's tags inside a savepoint of `tx`
///
/// On failure the savepoint is rolled back, so the previous tags stay, and
/// the update carries on.
async fn replace_tags_in_savepoint(
    tx: &mut Transaction<'_, Postgres>,
    reminder_id: Uuid,
    targets: &[TagTarget],
) {
    let mut savepoint = match (&mut *tx).begin().await {
        Ok(sp) => sp,
        Err(e) => {
            tracing::warn!(%reminder_id, error = %e, "Could not open savepoint for tag replacement");
            return;
        }
    };

    match reminder_tag::replace_all(&mut savepoint, reminder_id, targets).await {
        Ok(()) => {
            if let Err(e) = savepoint.commit().await {
                tracing::warn!(%reminder_id, error = %e, "Failed to release tag savepoint");
            }
        }
        Err(e) => {
            tracing::warn!(%reminder_id, error = %e, "Tag replacement failed, keeping previous tags");
            if let Err(e) = savepoint.rollback().await {
                tracing::warn!(%reminder_id, error = %e, "Failed to roll back tag replacement");
            }
        }
    }
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    let position = query.position.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let reminders = TaskReminder::list_visible(db, query.user_id, position).await?;

    Ok(Json(reminders).into_response())
}

pub async fn get_reminder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    let reminder = TaskReminder::find_detail(db, id).await?.ok_or_else(not_found)?;
    Ok(Json(reminder).into_response())
}

pub async fn create_reminder(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut req): Json<ReminderRequest>,
) -> ApiResult<Response> {
    req.fields.title = req
        .fields
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if req.fields.title.is_none() {
        return Err(ApiError::missing_fields(&["title"]));
    }

    let created_by = actor.user_id.or(req.created_by);
    let targets = req.tag_targets().unwrap_or_default();

    let Some(db) = &state.db else {
        req.fields.priority.get_or_insert_with(|| DEFAULT_PRIORITY.to_string());
        req.fields.status.get_or_insert_with(|| DEFAULT_STATUS.to_string());
        let (status, Json(mut record)) = stub::created(&req.fields);
        record["createdBy"] = json!(created_by);
        record["tags"] = json!([]);
        record["completions"] = json!([]);
        return Ok((status, Json(record)).into_response());
    };

    let mut tx = db.begin().await?;
    let reminder = TaskReminder::create(&mut *tx, req.fields, created_by).await?;
    reminder_tag::insert_many(&mut tx, reminder.id, &targets).await?;
    tx.commit().await?;

    tracing::info!(
        reminder_id = %reminder.id,
        tags = targets.len(),
        created_by = ?created_by,
        "Task reminder created"
    );

    let detail = TaskReminder::find_detail(db, reminder.id)
        .await?
        .ok_or_else(not_found)?;

    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

pub async fn update_reminder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<ReminderRequest>,
) -> ApiResult<Response> {
    let anonymous_writes = state.config.access.reminder_anonymous_writes;

    let Some(db) = &state.db else {
        if actor.user_id.is_none() && !anonymous_writes {
            return Err(ApiError::Unauthorized("Sign in to modify reminders".to_string()));
        }
        return Ok(stub::updated(id, &req.fields).into_response());
    };

    let mut tx = db.begin().await?;

    let existing = TaskReminder::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(not_found)?;
    actor.ensure_reminder_owner(&existing, anonymous_writes)?;

    let targets = req.tag_targets();
    TaskReminder::update(&mut *tx, id, req.fields)
        .await?
        .ok_or_else(not_found)?;

    if let Some(targets) = targets {
        replace_tags_in_savepoint(&mut tx, id, &targets).await;
    }

    tx.commit().await?;

    let detail = TaskReminder::find_detail(db, id).await?.ok_or_else(not_found)?;
    Ok(Json(detail).into_response())
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let anonymous_writes = state.config.access.reminder_anonymous_writes;

    let Some(db) = &state.db else {
        if actor.user_id.is_none() && !anonymous_writes {
            return Err(ApiError::Unauthorized("Sign in to modify reminders".to_string()));
        }
        return Ok(stub::success());
    };

    let existing = TaskReminder::find_by_id(db, id).await?.ok_or_else(not_found)?;
    actor.ensure_reminder_owner(&existing, anonymous_writes)?;

    TaskReminder::delete(db, id).await?;
    tracing::info!(reminder_id = %id, deleted_by = %actor.display_name(), "Task reminder deleted");

    Ok(stub::success())
}
