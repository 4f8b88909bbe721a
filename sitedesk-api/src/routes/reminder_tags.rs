/// Reminder tag endpoints
///
/// - `GET /api/task-reminders/:id/tags`
/// - `POST /api/task-reminders/:id/tags` `{ "userIds": [...], "positions": [...] }` appends
/// - `DELETE /api/task-reminders/:id/tags?userId=&position=` removes matching
///   tags, or every tag when neither filter is given
///
/// Writes go through the same creator check as reminder updates.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitedesk_shared::models::{
    de,
    reminder_tag::{self, TagTarget},
    task_reminder::TaskReminder,
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTagsRequest {
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub positions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTagsQuery {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub position: Option<String>,
}

async fn owned_reminder(
    db: &PgPool,
    state: &AppState,
    actor: &Actor,
    id: Uuid,
) -> ApiResult<TaskReminder> {
    let reminder = TaskReminder::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task reminder not found".to_string()))?;
    actor.ensure_reminder_owner(&reminder, state.config.access.reminder_anonymous_writes)?;
    Ok(reminder)
}

pub async fn list_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    if TaskReminder::find_by_id(db, id).await?.is_none() {
        return Err(ApiError::NotFound("Task reminder not found".to_string()));
    }

    Ok(Json(reminder_tag::list_for_reminder(db, id).await?).into_response())
}

pub async fn add_tags(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<AddTagsRequest>,
) -> ApiResult<Response> {
    let targets = TagTarget::from_lists(&req.user_ids, &req.positions);
    if targets.is_empty() {
        return Err(ApiError::BadRequest(
            "Provide at least one of userIds or positions".to_string(),
        ));
    }

    let Some(db) = &state.db else {
        return Ok(Json(json!({ "success": true, "added": targets.len() })).into_response());
    };

    owned_reminder(db, &state, &actor, id).await?;

    let mut conn = db.acquire().await?;
    reminder_tag::insert_many(&mut conn, id, &targets).await?;
    drop(conn);

    tracing::debug!(reminder_id = %id, added = targets.len(), "Reminder tags added");

    Ok(Json(reminder_tag::list_for_reminder(db, id).await?).into_response())
}

pub async fn remove_tags(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Query(query): Query<RemoveTagsQuery>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    owned_reminder(db, &state, &actor, id).await?;

    let position = query.position.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let removed = reminder_tag::delete_matching(db, id, query.user_id, position).await?;

    tracing::debug!(reminder_id = %id, removed, "Reminder tags removed");

    Ok(Json(json!({ "success": true, "removed": removed })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults_to_empty_lists() {
        let req: AddTagsRequest = serde_json::from_value(json!({ "positions": ["Engineer"] })).unwrap();

        assert!(req.user_ids.is_empty());
        assert_eq!(
            TagTarget::from_lists(&req.user_ids, &req.positions),
            vec![TagTarget::Position("Engineer".to_string())]
        );
    }
}
