/// Per-user completion marks on reminders
///
/// Each user ticks a reminder off independently. The pair
/// `(reminder_id, user_id)` is unique; marking twice is not an error.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_reminder_completions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     reminder_id UUID NOT NULL REFERENCES task_reminders(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     completed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (reminder_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::UserSummary;
use crate::db::is_unique_violation;

/// Completion resolved for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CompletionRow {
    id: Uuid,
    reminder_id: Uuid,
    user_id: Uuid,
    completed_at: DateTime<Utc>,
    username: Option<String>,
    full_name: Option<String>,
    position: Option<String>,
}

impl CompletionRow {
    fn into_view(self) -> (Uuid, CompletionView) {
        let user = self.username.map(|username| UserSummary {
            id: self.user_id,
            username,
            full_name: self.full_name,
            position: self.position,
        });

        (
            self.reminder_id,
            CompletionView {
                id: self.id,
                user_id: self.user_id,
                completed_at: self.completed_at,
                user,
            },
        )
    }
}

/// Records that `user_id` finished the reminder
///
/// Returns `true` when a new row was written and `false` when the user had
/// already marked it; the unique violation is absorbed.
pub async fn mark_done<'e>(
    executor: impl PgExecutor<'e>,
    reminder_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO task_reminder_completions (reminder_id, user_id) VALUES ($1, $2)",
    )
    .bind(reminder_id)
    .bind(user_id)
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Removes the user's mark; absent marks are fine
///
/// Returns whether a row was deleted.
pub async fn unmark<'e>(
    executor: impl PgExecutor<'e>,
    reminder_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM task_reminder_completions WHERE reminder_id = $1 AND user_id = $2",
    )
    .bind(reminder_id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Resolved completions of several reminders, paired with their reminder id
pub async fn list_for_reminders<'e>(
    executor: impl PgExecutor<'e>,
    reminder_ids: &[Uuid],
) -> Result<Vec<(Uuid, CompletionView)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CompletionRow>(
        "SELECT c.id, c.reminder_id, c.user_id, c.completed_at, \
                u.username, u.full_name, u.position \
         FROM task_reminder_completions c \
         LEFT JOIN users u ON u.id = c.user_id \
         WHERE c.reminder_id = ANY($1) \
         ORDER BY c.completed_at",
    )
    .bind(reminder_ids)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(CompletionRow::into_view).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_row_resolves_user() {
        let user_id = Uuid::new_v4();
        let reminder_id = Uuid::new_v4();
        let row = CompletionRow {
            id: Uuid::new_v4(),
            reminder_id,
            user_id,
            completed_at: Utc::now(),
            username: Some("ana".to_string()),
            full_name: Some("Ana Reyes".to_string()),
            position: None,
        };

        let (owner, view) = row.into_view();
        assert_eq!(owner, reminder_id);
        assert_eq!(view.user.unwrap().id, user_id);
    }

    #[test]
    fn test_completion_view_serialization() {
        let view = CompletionView {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            completed_at: Utc::now(),
            user: None,
        };

        let json = serde_json::to_value(view).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("completedAt").is_some());
        assert!(json["user"].is_null());
    }
}
