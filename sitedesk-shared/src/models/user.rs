/// Staff accounts
///
/// Users double as employees: the employee-management screens and the login
/// form both work on this table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL UNIQUE,
///     password TEXT,
///     password_hash TEXT,
///     full_name VARCHAR(255),
///     position VARCHAR(100),
///     email VARCHAR(255),
///     phone VARCHAR(50),
///     employee_id VARCHAR(50),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `password_hash` is a legacy column from before the rename to `password`.
/// It holds the same plaintext value and is kept in step on every write so
/// older rows can still log in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password, password_hash, full_name, position, \
                            email, phone, employee_id, created_at, updated_at";

/// User row
///
/// Password columns are never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    pub username: String,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub full_name: Option<String>,

    /// Job position, also used for position-wide reminder tags
    pub position: Option<String>,

    pub email: Option<String>,

    pub phone: Option<String>,

    /// Company-issued employee number
    pub employee_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Compact user reference embedded in joined responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub position: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            position: user.position.clone(),
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
}

/// Input for updating a user
///
/// Only `Some` fields are written. A new password is written to both
/// password columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.position.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.employee_id.is_none()
    }
}

impl User {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// A taken username surfaces as a unique violation on `users_username_key`;
    /// callers check it with [`crate::db::is_unique_violation`].
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, password, password_hash, full_name, position, email, phone, employee_id) \
             VALUES ($1, $2, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.password)
            .bind(data.full_name)
            .bind(data.position)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.employee_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Lists every user, alphabetically by full name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY full_name NULLS LAST, username"
        );

        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Updates the `Some` fields of `data`
    ///
    /// Returns `None` when the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET list from the fields that are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${bind_count}"));
        }
        if data.password.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                ", password = ${bind_count}, password_hash = ${bind_count}"
            ));
        }
        for (column, present) in [
            ("full_name", data.full_name.is_some()),
            ("position", data.position.is_some()),
            ("email", data.email.is_some()),
            ("phone", data.phone.is_some()),
            ("employee_id", data.employee_id.is_some()),
        ] {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {column} = ${bind_count}"));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        // Bind order must match the SET list above
        for value in [
            data.username,
            data.password,
            data.full_name,
            data.position,
            data.email,
            data.phone,
            data.employee_id,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(value);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user, returning whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdelacruz".to_string(),
            password: Some("secret".to_string()),
            password_hash: Some("secret".to_string()),
            full_name: Some("Juan Dela Cruz".to_string()),
            position: Some("Foreman".to_string()),
            email: None,
            phone: None,
            employee_id: Some("EMP-007".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_hides_passwords() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert_eq!(json["username"], "jdelacruz");
        assert_eq!(json["fullName"], "Juan Dela Cruz");
        assert_eq!(json["employeeId"], "EMP-007");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("full_name").is_none());
    }

    #[test]
    fn test_summary_from_user() {
        let user = sample_user();
        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, user.id);
        assert_eq!(summary.position.as_deref(), Some("Foreman"));
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());

        let update = UpdateUser {
            phone: Some("0917".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
