/// Completion toggling
///
/// `POST /api/task-reminders/:id/complete` marks the reminder done for one
/// user and `DELETE` clears the mark. Both are idempotent. The user is the
/// body's `userId`, else the caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitedesk_shared::models::{de, reminder_completion, task_reminder::TaskReminder};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub user_id: Option<Uuid>,
}

fn completing_user(body: Option<Json<CompletionRequest>>, actor: &Actor) -> ApiResult<Uuid> {
    body.and_then(|Json(req)| req.user_id)
        .or(actor.user_id)
        .ok_or_else(|| ApiError::missing_fields(&["userId"]))
}

pub async fn mark_complete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Option<Json<CompletionRequest>>,
) -> ApiResult<Json<Value>> {
    let user_id = completing_user(body, &actor)?;

    let Some(db) = &state.db else {
        return Ok(Json(json!({ "success": true, "completed": true, "userId": user_id })));
    };

    if TaskReminder::find_by_id(db, id).await?.is_none() {
        return Err(ApiError::NotFound("Task reminder not found".to_string()));
    }

    let inserted = reminder_completion::mark_done(db, id, user_id).await?;
    if !inserted {
        tracing::debug!(reminder_id = %id, %user_id, "Reminder already marked complete");
    }

    Ok(Json(json!({ "success": true, "completed": true, "userId": user_id })))
}

pub async fn unmark_complete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Option<Json<CompletionRequest>>,
) -> ApiResult<Json<Value>> {
    let user_id = completing_user(body, &actor)?;

    if let Some(db) = &state.db {
        reminder_completion::unmark(db, id, user_id).await?;
    }

    Ok(Json(json!({ "success": true, "completed": false, "userId": user_id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ActorSource;

    fn signed_in(user_id: Uuid) -> Actor {
        Actor {
            user_id: Some(user_id),
            username: Some("maria".to_string()),
            source: ActorSource::Headers,
        }
    }

    #[test]
    fn test_body_user_wins_over_actor() {
        let body_user = Uuid::new_v4();
        let body = Some(Json(CompletionRequest {
            user_id: Some(body_user),
        }));

        assert_eq!(completing_user(body, &signed_in(Uuid::new_v4())).unwrap(), body_user);
    }

    #[test]
    fn test_falls_back_to_actor() {
        let actor_id = Uuid::new_v4();
        assert_eq!(completing_user(None, &signed_in(actor_id)).unwrap(), actor_id);
    }

    #[test]
    fn test_no_user_is_bad_request() {
        let err = completing_user(None, &Actor::anonymous()).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
