/// Task reminders
///
/// A reminder belongs to its creator, may reference a project, and is shown
/// to users through [`reminder_tag`](super::reminder_tag) rows. Each user
/// can tick it off independently via
/// [`reminder_completion`](super::reminder_completion).
///
/// Reads return [`TaskReminderDetail`]: the reminder joined with its project,
/// creator, tags and completions, rebuilt on every call.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_reminders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     reminder_date DATE,
///     reminder_time VARCHAR(20),
///     deadline DATE,
///     priority VARCHAR(20) NOT NULL DEFAULT 'medium',
///     status VARCHAR(20) NOT NULL DEFAULT 'pending',
///     project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::de;
use crate::db::patch::Patch;
use super::project::ProjectSummary;
use super::reminder_completion::{self, CompletionView};
use super::reminder_tag::{self, TagView};
use super::user::UserSummary;

const REMINDER_COLUMNS: &str = "id, title, description, reminder_date, reminder_time, deadline, \
                                priority, status, project_id, created_by, created_at, updated_at";

pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskReminder {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub reminder_date: Option<NaiveDate>,

    /// Wall-clock time as typed, e.g. `"14:30"`
    pub reminder_time: Option<String>,

    pub deadline: Option<NaiveDate>,
    pub priority: String,
    pub status: String,
    pub project_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskReminder {
    /// Whether `user_id` is the recorded creator
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by == Some(user_id)
    }
}

/// Reminder with everything the reminder card shows
#[derive(Debug, Clone, Serialize)]
pub struct TaskReminderDetail {
    #[serde(flatten)]
    pub reminder: TaskReminder,
    pub project: Option<ProjectSummary>,
    pub creator: Option<UserSummary>,
    pub tags: Vec<TagView>,
    pub completions: Vec<CompletionView>,
}

/// Reminder fields accepted on create and update
///
/// On update, absent fields are kept and nullable fields sent as null or
/// blank are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReminderInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub reminder_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub reminder_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub project_id: Option<Option<Uuid>>,
}

/// Flat row of a reminder joined with its project and creator
#[derive(Debug, Clone, sqlx::FromRow)]
struct ReminderJoinRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    reminder_date: Option<NaiveDate>,
    reminder_time: Option<String>,
    deadline: Option<NaiveDate>,
    priority: String,
    status: String,
    project_id: Option<Uuid>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_name: Option<String>,
    project_status: Option<String>,
    creator_username: Option<String>,
    creator_full_name: Option<String>,
    creator_position: Option<String>,
}

impl ReminderJoinRow {
    fn into_detail(self) -> TaskReminderDetail {
        let project = match (self.project_id, self.project_name, self.project_status) {
            (Some(id), Some(name), Some(status)) => Some(ProjectSummary { id, name, status }),
            _ => None,
        };
        let creator = match (self.created_by, self.creator_username) {
            (Some(id), Some(username)) => Some(UserSummary {
                id,
                username,
                full_name: self.creator_full_name,
                position: self.creator_position,
            }),
            _ => None,
        };

        TaskReminderDetail {
            reminder: TaskReminder {
                id: self.id,
                title: self.title,
                description: self.description,
                reminder_date: self.reminder_date,
                reminder_time: self.reminder_time,
                deadline: self.deadline,
                priority: self.priority,
                status: self.status,
                project_id: self.project_id,
                created_by: self.created_by,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            project,
            creator,
            tags: Vec::new(),
            completions: Vec::new(),
        }
    }
}

const DETAIL_SELECT: &str = "SELECT r.id, r.title, r.description, r.reminder_date, r.reminder_time, \
                                    r.deadline, r.priority, r.status, r.project_id, r.created_by, \
                                    r.created_at, r.updated_at, \
                                    p.name AS project_name, p.status AS project_status, \
                                    u.username AS creator_username, \
                                    u.full_name AS creator_full_name, \
                                    u.position AS creator_position \
                             FROM task_reminders r \
                             LEFT JOIN projects p ON p.id = r.project_id \
                             LEFT JOIN users u ON u.id = r.created_by";

impl TaskReminder {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        data: TaskReminderInput,
        created_by: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_reminders (title, description, reminder_date, reminder_time, deadline, \
                                         priority, status, project_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {REMINDER_COLUMNS}"
        );

        sqlx::query_as::<_, TaskReminder>(&query)
            .bind(data.title.unwrap_or_default())
            .bind(data.description.flatten())
            .bind(data.reminder_date.flatten())
            .bind(data.reminder_time.flatten())
            .bind(data.deadline.flatten())
            .bind(data.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()))
            .bind(data.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
            .bind(data.project_id.flatten())
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {REMINDER_COLUMNS} FROM task_reminders WHERE id = $1");

        sqlx::query_as::<_, TaskReminder>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn update_patch(data: TaskReminderInput) -> Patch<'static> {
        let not_blank = |v: Option<String>| v.filter(|v| !v.trim().is_empty());

        let mut patch = Patch::new("task_reminders");
        patch
            .set("title", not_blank(data.title))
            .set("description", data.description)
            .set("reminder_date", data.reminder_date)
            .set("reminder_time", data.reminder_time)
            .set("deadline", data.deadline)
            .set("priority", not_blank(data.priority))
            .set("status", not_blank(data.status))
            .set("project_id", data.project_id);
        patch
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        data: TaskReminderInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = Self::update_patch(data).finish(id, REMINDER_COLUMNS);
        let reminder = query
            .build_query_as::<TaskReminder>()
            .fetch_optional(executor)
            .await?;

        Ok(reminder)
    }

    /// Deletes a reminder; tags and completions go with it
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_reminders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads one reminder with its project, creator, tags and completions
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskReminderDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.id = $1");
        let Some(row) = sqlx::query_as::<_, ReminderJoinRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let mut details = Self::attach_relations(pool, vec![row.into_detail()]).await?;
        Ok(details.pop())
    }

    /// Lists reminders visible to a user
    ///
    /// A reminder is visible when the user created it, is tagged on it, or
    /// holds a tagged position. With neither filter every reminder is
    /// returned. Ordered by reminder date, undated last.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: Option<Uuid>,
        position: Option<&str>,
    ) -> Result<Vec<TaskReminderDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE ($1::uuid IS NULL AND $2::text IS NULL) \
                OR r.created_by = $1 \
                OR EXISTS ( \
                    SELECT 1 FROM task_reminder_tags t \
                    WHERE t.reminder_id = r.id AND (t.user_id = $1 OR t.position = $2) \
                ) \
             ORDER BY r.reminder_date NULLS LAST, r.created_at DESC"
        );

        let rows = sqlx::query_as::<_, ReminderJoinRow>(&query)
            .bind(user_id)
            .bind(position)
            .fetch_all(pool)
            .await?;

        Self::attach_relations(pool, rows.into_iter().map(ReminderJoinRow::into_detail).collect())
            .await
    }

    /// Fills in tags and completions with one query each
    async fn attach_relations(
        pool: &PgPool,
        mut details: Vec<TaskReminderDetail>,
    ) -> Result<Vec<TaskReminderDetail>, sqlx::Error> {
        if details.is_empty() {
            return Ok(details);
        }

        let ids: Vec<Uuid> = details.iter().map(|d| d.reminder.id).collect();

        let mut tags: HashMap<Uuid, Vec<TagView>> = HashMap::new();
        for (reminder_id, tag) in reminder_tag::list_for_reminders(pool, &ids).await? {
            tags.entry(reminder_id).or_default().push(tag);
        }

        let mut completions: HashMap<Uuid, Vec<CompletionView>> = HashMap::new();
        for (reminder_id, completion) in reminder_completion::list_for_reminders(pool, &ids).await? {
            completions.entry(reminder_id).or_default().push(completion);
        }

        for detail in &mut details {
            let id = detail.reminder.id;
            detail.tags = tags.remove(&id).unwrap_or_default();
            detail.completions = completions.remove(&id).unwrap_or_default();
        }

        Ok(details)
    }
}
