/// Reminder tags: who should see a reminder
///
/// A tag points either at one user or at a whole position (e.g. every
/// "Foreman"). The table's CHECK constraint enforces exactly one of the two.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_reminder_tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     reminder_id UUID NOT NULL REFERENCES task_reminders(id) ON DELETE CASCADE,
///     user_id UUID REFERENCES users(id) ON DELETE CASCADE,
///     position VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK ((user_id IS NULL) <> (position IS NULL))
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use super::user::UserSummary;

/// Who a tag targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagTarget {
    User(Uuid),
    Position(String),
}

impl TagTarget {
    /// Builds targets from the `userIds` / `positions` lists of a request
    ///
    /// Blank positions are dropped and duplicates removed, keeping first
    /// occurrence order.
    pub fn from_lists(user_ids: &[Uuid], positions: &[String]) -> Vec<Self> {
        let mut targets: Vec<Self> = Vec::with_capacity(user_ids.len() + positions.len());

        let candidates = user_ids.iter().copied().map(TagTarget::User).chain(
            positions
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| TagTarget::Position(p.to_string())),
        );

        for target in candidates {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        targets
    }
}

/// Tag resolved for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TagView {
    User {
        id: Uuid,
        #[serde(rename = "createdAt")]
        created_at: DateTime<Utc>,
        user: UserSummary,
    },
    Position {
        id: Uuid,
        #[serde(rename = "createdAt")]
        created_at: DateTime<Utc>,
        position: String,
    },
}

/// Raw tag joined with its user, if any
#[derive(Debug, Clone, sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    reminder_id: Uuid,
    user_id: Option<Uuid>,
    position: Option<String>,
    created_at: DateTime<Utc>,
    username: Option<String>,
    full_name: Option<String>,
    user_position: Option<String>,
}

impl TagRow {
    fn into_view(self) -> Option<(Uuid, TagView)> {
        let view = match (self.user_id, self.position) {
            (Some(user_id), _) => TagView::User {
                id: self.id,
                created_at: self.created_at,
                user: UserSummary {
                    id: user_id,
                    username: self.username?,
                    full_name: self.full_name,
                    position: self.user_position,
                },
            },
            (None, Some(position)) => TagView::Position {
                id: self.id,
                created_at: self.created_at,
                position,
            },
            (None, None) => return None,
        };

        Some((self.reminder_id, view))
    }
}

const TAG_SELECT: &str = "SELECT t.id, t.reminder_id, t.user_id, t.position, t.created_at, \
                                 u.username, u.full_name, u.position AS user_position \
                          FROM task_reminder_tags t \
                          LEFT JOIN users u ON u.id = t.user_id";

/// Inserts tags for a reminder
pub async fn insert_many(
    conn: &mut PgConnection,
    reminder_id: Uuid,
    targets: &[TagTarget],
) -> Result<(), sqlx::Error> {
    for target in targets {
        let (user_id, position) = match target {
            TagTarget::User(id) => (Some(*id), None),
            TagTarget::Position(p) => (None, Some(p.as_str())),
        };

        sqlx::query(
            "INSERT INTO task_reminder_tags (reminder_id, user_id, position) VALUES ($1, $2, $3)",
        )
        .bind(reminder_id)
        .bind(user_id)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Removes every tag of a reminder and inserts `targets` instead
pub async fn replace_all(
    conn: &mut PgConnection,
    reminder_id: Uuid,
    targets: &[TagTarget],
) -> Result<(), sqlx::Error> {
    delete_matching(&mut *conn, reminder_id, None, None).await?;
    insert_many(conn, reminder_id, targets).await
}

/// Deletes tags of a reminder
///
/// With no filter every tag goes; otherwise only tags for `user_id` and/or
/// `position` are removed. Returns the number of deleted rows.
pub async fn delete_matching<'e>(
    executor: impl PgExecutor<'e>,
    reminder_id: Uuid,
    user_id: Option<Uuid>,
    position: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM task_reminder_tags \
         WHERE reminder_id = $1 \
           AND (($2::uuid IS NULL AND $3::text IS NULL) OR user_id = $2 OR position = $3)",
    )
    .bind(reminder_id)
    .bind(user_id)
    .bind(position)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Resolved tags of one reminder, oldest first
pub async fn list_for_reminder<'e>(
    executor: impl PgExecutor<'e>,
    reminder_id: Uuid,
) -> Result<Vec<TagView>, sqlx::Error> {
    Ok(list_for_reminders(executor, &[reminder_id])
        .await?
        .into_iter()
        .map(|(_, view)| view)
        .collect())
}

/// Resolved tags of several reminders, paired with their reminder id
pub async fn list_for_reminders<'e>(
    executor: impl PgExecutor<'e>,
    reminder_ids: &[Uuid],
) -> Result<Vec<(Uuid, TagView)>, sqlx::Error> {
    let query = format!("{TAG_SELECT} WHERE t.reminder_id = ANY($1) ORDER BY t.created_at, t.id");

    let rows = sqlx::query_as::<_, TagRow>(&query)
        .bind(reminder_ids)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().filter_map(TagRow::into_view).collect())
}
