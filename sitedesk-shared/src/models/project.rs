/// Projects and their audit stamp
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     client_name VARCHAR(255),
///     client_email VARCHAR(255),
///     client_phone VARCHAR(50),
///     address TEXT,
///     scope TEXT,
///     cost DOUBLE PRECISION,
///     deadline DATE,
///     status VARCHAR(50) NOT NULL DEFAULT 'ongoing',
///     files JSONB NOT NULL DEFAULT '[]',
///     last_edited_by VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `status` is free-form; the UI uses values like `ongoing` and `completed`
/// but nothing here restricts them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::de;
use crate::db::patch::Patch;
use super::project_task::ProjectTask;

const PROJECT_COLUMNS: &str = "id, name, client_name, client_email, client_phone, address, scope, \
                               cost, deadline, status, files, last_edited_by, created_at, updated_at";

/// Status given to projects created without one
pub const DEFAULT_STATUS: &str = "ongoing";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub address: Option<String>,
    pub scope: Option<String>,
    pub cost: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub status: String,

    /// Attached file references, stored as an opaque JSON array
    pub files: JsonValue,

    /// Display name of whoever last touched the project or one of its tasks
    pub last_edited_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with its tasks in display order
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<ProjectTask>,
}

/// Minimal project reference embedded in reminders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub status: String,
}

/// Project fields accepted on create and update
///
/// On update, absent fields keep their stored value; nullable fields sent as
/// null or blank are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub scope: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable_amount")]
    pub cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub files: Option<JsonValue>,
}

impl Project {
    pub async fn create(
        pool: &PgPool,
        data: ProjectInput,
        edited_by: &str,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, client_name, client_email, client_phone, address, scope, \
                                   cost, deadline, status, files, last_edited_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.name.unwrap_or_default())
            .bind(data.client_name.flatten())
            .bind(data.client_email.flatten())
            .bind(data.client_phone.flatten())
            .bind(data.address.flatten())
            .bind(data.scope.flatten())
            .bind(data.cost.flatten())
            .bind(data.deadline.flatten())
            .bind(data.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
            .bind(data.files.unwrap_or_else(|| JsonValue::Array(Vec::new())))
            .bind(edited_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Loads one project with its ordered tasks
    pub async fn find_with_tasks(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ProjectWithTasks>, sqlx::Error> {
        let Some(project) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let tasks = ProjectTask::list_by_project(pool, id).await?;

        Ok(Some(ProjectWithTasks { project, tasks }))
    }

    /// Lists all projects, most recently updated first, each with its tasks
    ///
    /// Tasks are fetched in a single query and grouped in memory.
    pub async fn list_with_tasks(pool: &PgPool) -> Result<Vec<ProjectWithTasks>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC");
        let projects = sqlx::query_as::<_, Project>(&query).fetch_all(pool).await?;

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let mut tasks_by_project: HashMap<Uuid, Vec<ProjectTask>> = HashMap::new();
        for task in ProjectTask::list_by_projects(pool, &ids).await? {
            tasks_by_project.entry(task.project_id).or_default().push(task);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let tasks = tasks_by_project.remove(&project.id).unwrap_or_default();
                ProjectWithTasks { project, tasks }
            })
            .collect())
    }

    fn update_patch(data: ProjectInput, edited_by: &str) -> Patch<'static> {
        let mut patch = Patch::new("projects");
        patch
            .set("name", data.name.filter(|n| !n.trim().is_empty()))
            .set("client_name", data.client_name)
            .set("client_email", data.client_email)
            .set("client_phone", data.client_phone)
            .set("address", data.address)
            .set("scope", data.scope)
            .set("cost", data.cost)
            .set("deadline", data.deadline)
            .set("status", data.status.filter(|s| !s.trim().is_empty()))
            .set("files", data.files)
            .set("last_edited_by", Some(edited_by.to_string()));
        patch
    }

    /// Updates the provided fields and stamps the editor
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: ProjectInput,
        edited_by: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = Self::update_patch(data, edited_by).finish(id, PROJECT_COLUMNS);
        let project = query.build_query_as::<Project>().fetch_optional(pool).await?;

        Ok(project)
    }

    /// Stamps `updated_at` and `last_edited_by` without touching anything else
    ///
    /// Called after every task mutation. Returns whether the project exists.
    pub async fn touch<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        edited_by: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET updated_at = NOW(), last_edited_by = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(edited_by)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a project and, through the foreign key, its tasks
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_input_accepts_frontend_shape() {
        let input: ProjectInput = serde_json::from_value(serde_json::json!({
            "name": "Warehouse extension",
            "clientName": "Acme Trading",
            "cost": "₱2,500,000",
            "deadline": "",
            "files": ["plans.pdf"]
        }))
        .unwrap();

        assert_eq!(input.name.as_deref(), Some("Warehouse extension"));
        assert_eq!(input.client_name, Some(Some("Acme Trading".to_string())));
        assert_eq!(input.cost, Some(Some(2_500_000.0)));
        assert_eq!(input.deadline, Some(None));
        assert!(input.status.is_none());
    }

    #[test]
    fn test_update_clears_sent_nulls_and_stamps_editor() {
        let input: ProjectInput = serde_json::from_value(serde_json::json!({
            "name": "",
            "clientPhone": null,
            "deadline": ""
        }))
        .unwrap();

        assert_eq!(
            Project::update_patch(input, "maria").sql(),
            "UPDATE projects SET updated_at = NOW(), client_phone = $1, deadline = $2, \
             last_edited_by = $3"
        );
    }

    #[test]
    fn test_project_with_tasks_flattens() {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Fit-out".to_string(),
            client_name: None,
            client_email: None,
            client_phone: None,
            address: None,
            scope: None,
            cost: Some(10.0),
            deadline: None,
            status: DEFAULT_STATUS.to_string(),
            files: JsonValue::Array(Vec::new()),
            last_edited_by: Some("Admin".to_string()),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(ProjectWithTasks {
            project,
            tasks: Vec::new(),
        })
        .unwrap();

        assert_eq!(json["name"], "Fit-out");
        assert_eq!(json["lastEditedBy"], "Admin");
        assert!(json["tasks"].as_array().unwrap().is_empty());
    }
}
