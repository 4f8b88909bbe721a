/// Project subtasks
///
/// Tasks are ordered inside their project by `order_index`. New tasks go to
/// the end of the list: the index is computed inside the INSERT so no
/// separate read is needed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     finished BOOLEAN NOT NULL DEFAULT FALSE,
///     order_index INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, project_id, name, finished, order_index, created_at, updated_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub finished: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectTask {
    pub name: String,
    #[serde(default)]
    pub finished: bool,
}

/// Fields accepted when updating a task; absent fields are kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectTask {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub finished: Option<bool>,
    #[serde(default)]
    pub order_index: Option<i32>,
}

impl ProjectTask {
    /// Appends a task to the end of the project's list
    ///
    /// The new `order_index` is one past the current maximum, or 0 for the
    /// first task.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        project_id: Uuid,
        data: CreateProjectTask,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_tasks (project_id, name, finished, order_index) \
             SELECT $1, $2::text, $3::boolean, COALESCE(MAX(order_index) + 1, 0) \
             FROM project_tasks WHERE project_id = $1 \
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, ProjectTask>(&query)
            .bind(project_id)
            .bind(data.name)
            .bind(data.finished)
            .fetch_one(executor)
            .await
    }

    pub async fn list_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks \
             WHERE project_id = $1 ORDER BY order_index, created_at"
        );

        sqlx::query_as::<_, ProjectTask>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Tasks of several projects at once, ordered within each project
    pub async fn list_by_projects<'e>(
        executor: impl PgExecutor<'e>,
        project_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM project_tasks \
             WHERE project_id = ANY($1) ORDER BY project_id, order_index, created_at"
        );

        sqlx::query_as::<_, ProjectTask>(&query)
            .bind(project_ids)
            .fetch_all(executor)
            .await
    }

    /// Updates a task of the given project
    ///
    /// Returns `None` when the task does not exist or belongs to another
    /// project.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        project_id: Uuid,
        task_id: Uuid,
        data: UpdateProjectTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE project_tasks SET \
                name = COALESCE($3, name), \
                finished = COALESCE($4, finished), \
                order_index = COALESCE($5, order_index), \
                updated_at = NOW() \
             WHERE id = $2 AND project_id = $1 \
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, ProjectTask>(&query)
            .bind(project_id)
            .bind(task_id)
            .bind(data.name)
            .bind(data.finished)
            .bind(data.order_index)
            .fetch_optional(executor)
            .await
    }

    /// Deletes a task of the given project, returning whether it existed
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        project_id: Uuid,
        task_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_tasks WHERE id = $2 AND project_id = $1")
            .bind(project_id)
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_defaults_to_unfinished() {
        let input: CreateProjectTask =
            serde_json::from_str(r#"{"name": "Pour foundation"}"#).unwrap();
        assert_eq!(input.name, "Pour foundation");
        assert!(!input.finished);
    }

    #[test]
    fn test_update_task_reads_camel_case() {
        let input: UpdateProjectTask =
            serde_json::from_str(r#"{"finished": true, "orderIndex": 4}"#).unwrap();
        assert_eq!(input.finished, Some(true));
        assert_eq!(input.order_index, Some(4));
        assert!(input.name.is_none());
    }
}
