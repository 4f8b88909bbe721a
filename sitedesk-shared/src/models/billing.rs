/// Billing entries (invoices and their payment state)
///
/// # Schema
///
/// ```sql
/// CREATE TABLE billings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     invoice_number VARCHAR(100),
///     client_name VARCHAR(255),
///     project_name VARCHAR(255),
///     description TEXT,
///     amount DOUBLE PRECISION NOT NULL DEFAULT 0,
///     status VARCHAR(50) NOT NULL DEFAULT 'pending',
///     issue_date DATE,
///     due_date DATE,
///     payment_date DATE,
///     payment_method VARCHAR(100),
///     notes TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::de;
use crate::db::patch::Patch;

const BILLING_COLUMNS: &str = "id, invoice_number, client_name, project_name, description, amount, \
                               status, issue_date, due_date, payment_date, payment_method, notes, \
                               created_at, updated_at";

pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub id: Uuid,
    pub invoice_number: Option<String>,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub amount: f64,
    pub status: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Billing fields accepted on create and update
///
/// `amount` may arrive as a number or as typed text like `"$1,234.56"`. On
/// update, absent fields keep their value and nullable fields sent as null
/// or blank are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInput {
    #[serde(default, deserialize_with = "de::nullable")]
    pub invoice_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub project_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub issue_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub payment_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub payment_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub notes: Option<Option<String>>,
}

impl Billing {
    pub async fn create(pool: &PgPool, data: BillingInput) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO billings (invoice_number, client_name, project_name, description, amount, \
                                   status, issue_date, due_date, payment_date, payment_method, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {BILLING_COLUMNS}"
        );

        sqlx::query_as::<_, Billing>(&query)
            .bind(data.invoice_number.flatten())
            .bind(data.client_name.flatten())
            .bind(data.project_name.flatten())
            .bind(data.description.flatten())
            .bind(data.amount.unwrap_or(0.0))
            .bind(data.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
            .bind(data.issue_date.flatten())
            .bind(data.due_date.flatten())
            .bind(data.payment_date.flatten())
            .bind(data.payment_method.flatten())
            .bind(data.notes.flatten())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {BILLING_COLUMNS} FROM billings WHERE id = $1");

        sqlx::query_as::<_, Billing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {BILLING_COLUMNS} FROM billings ORDER BY created_at DESC");

        sqlx::query_as::<_, Billing>(&query).fetch_all(pool).await
    }

    fn update_patch(data: BillingInput) -> Patch<'static> {
        let mut patch = Patch::new("billings");
        patch
            .set("invoice_number", data.invoice_number)
            .set("client_name", data.client_name)
            .set("project_name", data.project_name)
            .set("description", data.description)
            .set("amount", data.amount)
            .set("status", data.status.filter(|s| !s.trim().is_empty()))
            .set("issue_date", data.issue_date)
            .set("due_date", data.due_date)
            .set("payment_date", data.payment_date)
            .set("payment_method", data.payment_method)
            .set("notes", data.notes);
        patch
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: BillingInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = Self::update_patch(data).finish(id, BILLING_COLUMNS);
        let billing = query.build_query_as::<Billing>().fetch_optional(pool).await?;

        Ok(billing)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM billings WHERE id = $1")
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
    fn test_billing_input_sanitizes_amount() {
        let input: BillingInput = serde_json::from_value(serde_json::json!({
            "invoiceNumber": "INV-0042",
            "amount": "$1,234.56abc",
            "dueDate": "2025-07-31"
        }))
        .unwrap();

        assert_eq!(input.invoice_number, Some(Some("INV-0042".to_string())));
        assert_eq!(input.amount, Some(1234.56));
        assert_eq!(input.due_date, Some(NaiveDate::from_ymd_opt(2025, 7, 31)));
        assert!(input.payment_date.is_none());
    }

    #[test]
    fn test_update_clears_blank_and_null_fields() {
        let input: BillingInput = serde_json::from_value(serde_json::json!({
            "paymentDate": "",
            "notes": null
        }))
        .unwrap();
        assert_eq!(input.payment_date, Some(None));
        assert_eq!(input.notes, Some(None));

        assert_eq!(
            Billing::update_patch(input).sql(),
            "UPDATE billings SET updated_at = NOW(), payment_date = $1, notes = $2"
        );
    }

    #[test]
    fn test_update_never_blanks_status() {
        let input: BillingInput =
            serde_json::from_value(serde_json::json!({ "status": " ", "amount": 10 })).unwrap();

        assert_eq!(
            Billing::update_patch(input).sql(),
            "UPDATE billings SET updated_at = NOW(), amount = $1"
        );
    }
}
