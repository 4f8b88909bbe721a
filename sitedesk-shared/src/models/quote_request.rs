/// Public quote requests submitted from the website contact form
///
/// # Lifecycle
///
/// ```text
/// pending → <any other status>
/// ```
///
/// Leaving `pending` records who reviewed the request and when. Nothing
/// further is modelled.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE quote_requests (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(50) NOT NULL,
///     company VARCHAR(255),
///     service_type VARCHAR(100) NOT NULL,
///     project_location TEXT,
///     message TEXT NOT NULL,
///     status VARCHAR(50) NOT NULL DEFAULT 'pending',
///     reviewed_by VARCHAR(255),
///     reviewed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const REQUEST_COLUMNS: &str = "id, name, email, phone, company, service_type, project_location, \
                               message, status, reviewed_by, reviewed_at, created_at, updated_at";

pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub service_type: String,
    pub project_location: Option<String>,
    pub message: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form submission
///
/// Required fields are `Option` so that missing ones can be reported together
/// instead of failing deserialization on the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub project_location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateQuoteRequest {
    /// Names (camelCase, as the form sends them) of required fields that are
    /// missing or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("serviceType", &self.service_type),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(field, _)| field)
        .collect()
    }
}

impl QuoteRequest {
    /// Stores a submission as `pending`
    ///
    /// Call [`CreateQuoteRequest::missing_fields`] first; blanks are stored
    /// as empty strings.
    pub async fn create(pool: &PgPool, data: CreateQuoteRequest) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO quote_requests (name, email, phone, company, service_type, \
                                         project_location, message, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {REQUEST_COLUMNS}"
        );

        sqlx::query_as::<_, QuoteRequest>(&query)
            .bind(data.name.unwrap_or_default())
            .bind(data.email.unwrap_or_default())
            .bind(data.phone.unwrap_or_default())
            .bind(data.company)
            .bind(data.service_type.unwrap_or_default())
            .bind(data.project_location)
            .bind(data.message.unwrap_or_default())
            .bind(STATUS_PENDING)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM quote_requests WHERE id = $1");

        sqlx::query_as::<_, QuoteRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first, optionally only those in `status`
    pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM quote_requests \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, QuoteRequest>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Sets the status; any status other than `pending` stamps the reviewer
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
        reviewed_by: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = if status == STATUS_PENDING {
            format!(
                "UPDATE quote_requests SET status = $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
            )
        } else {
            format!(
                "UPDATE quote_requests SET status = $2, reviewed_by = $3, reviewed_at = NOW(), \
                        updated_at = NOW() \
                 WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
            )
        };

        let mut q = sqlx::query_as::<_, QuoteRequest>(&query).bind(id).bind(status);
        if status != STATUS_PENDING {
            q = q.bind(reviewed_by);
        }

        q.fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quote_requests WHERE id = $1")
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
    fn test_missing_fields_reports_all_blanks() {
        let request = CreateQuoteRequest {
            name: Some("Maria".to_string()),
            email: Some("  ".to_string()),
            ..Default::default()
        };

        assert_eq!(
            request.missing_fields(),
            vec!["email", "phone", "serviceType", "message"]
        );
    }

    #[test]
    fn test_complete_request_has_no_missing_fields() {
        let request: CreateQuoteRequest = serde_json::from_value(serde_json::json!({
            "name": "Maria",
            "email": "maria@example.com",
            "phone": "0917 555 0101",
            "serviceType": "renovation",
            "message": "Kitchen remodel"
        }))
        .unwrap();

        assert!(request.missing_fields().is_empty());
    }
}
