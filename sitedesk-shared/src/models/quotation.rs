/// Quotations sent to clients
///
/// Line items are stored as the JSON the editor produces; the backend does
/// not interpret them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE quotations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     quote_number VARCHAR(50) NOT NULL UNIQUE,
///     client_name VARCHAR(255),
///     client_email VARCHAR(255),
///     client_phone VARCHAR(50),
///     client_address TEXT,
///     job_title VARCHAR(255),
///     job_location TEXT,
///     items JSONB NOT NULL DEFAULT '[]',
///     total DOUBLE PRECISION NOT NULL DEFAULT 0,
///     status VARCHAR(50) NOT NULL DEFAULT 'draft',
///     terms_template VARCHAR(50) NOT NULL DEFAULT 'standard',
///     valid_until DATE,
///     notes TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use super::de;
use crate::db::{is_unique_violation, patch::Patch};

const QUOTATION_COLUMNS: &str = "id, quote_number, client_name, client_email, client_phone, \
                                 client_address, job_title, job_location, items, total, status, \
                                 terms_template, valid_until, notes, created_at, updated_at";

pub const DEFAULT_STATUS: &str = "draft";
pub const DEFAULT_TERMS_TEMPLATE: &str = "standard";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: Uuid,
    pub quote_number: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub job_title: Option<String>,
    pub job_location: Option<String>,
    pub items: JsonValue,
    pub total: f64,
    pub status: String,

    /// Which terms-and-conditions block the PDF renderer prints
    pub terms_template: String,

    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quotation fields accepted on create and update
///
/// On update, absent fields keep their value and nullable fields sent as
/// null or blank are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationInput {
    #[serde(default)]
    pub quote_number: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub client_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub job_location: Option<Option<String>>,
    #[serde(default)]
    pub items: Option<JsonValue>,
    #[serde(default, deserialize_with = "de::amount")]
    pub total: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub terms_template: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub valid_until: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub notes: Option<Option<String>>,
}

impl QuotationInput {
    /// The number the client chose, if any
    fn chosen_number(&self) -> Option<&str> {
        self.quote_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Tries given to generated quote numbers before a collision is reported
pub const QUOTE_NUMBER_ATTEMPTS: u32 = 5;

/// Builds a quote number like `QT-20250314-0427`
pub fn generate_quote_number(date: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("QT-{}-{:04}", date.format("%Y%m%d"), suffix)
}

impl Quotation {
    /// Inserts a quotation, numbering it when the client did not
    pub async fn create(pool: &PgPool, data: QuotationInput) -> Result<Self, sqlx::Error> {
        Self::create_numbered(pool, data, || generate_quote_number(Utc::now().date_naive())).await
    }

    /// Inserts a quotation, drawing its number from `next_number` when the
    /// client sent none
    ///
    /// A drawn number that is already taken is replaced by the next one, up
    /// to [`QUOTE_NUMBER_ATTEMPTS`] times. A number the client chose is tried
    /// once.
    pub async fn create_numbered<F>(
        pool: &PgPool,
        data: QuotationInput,
        mut next_number: F,
    ) -> Result<Self, sqlx::Error>
    where
        F: FnMut() -> String,
    {
        if let Some(number) = data.chosen_number() {
            return Self::insert(pool, number, &data).await;
        }

        let mut attempt = 1;
        loop {
            let number = next_number();
            match Self::insert(pool, &number, &data).await {
                Err(e) if is_unique_violation(&e) && attempt < QUOTE_NUMBER_ATTEMPTS => {
                    tracing::debug!(quote_number = %number, attempt, "Generated quote number taken");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn insert(
        pool: &PgPool,
        quote_number: &str,
        data: &QuotationInput,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO quotations (quote_number, client_name, client_email, client_phone, \
                                     client_address, job_title, job_location, items, total, status, \
                                     terms_template, valid_until, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {QUOTATION_COLUMNS}"
        );
        let text = |value: &Option<Option<String>>| value.clone().flatten();

        sqlx::query_as::<_, Quotation>(&query)
            .bind(quote_number)
            .bind(text(&data.client_name))
            .bind(text(&data.client_email))
            .bind(text(&data.client_phone))
            .bind(text(&data.client_address))
            .bind(text(&data.job_title))
            .bind(text(&data.job_location))
            .bind(
                data.items
                    .clone()
                    .unwrap_or_else(|| JsonValue::Array(Vec::new())),
            )
            .bind(data.total.unwrap_or(0.0))
            .bind(data.status.as_deref().unwrap_or(DEFAULT_STATUS))
            .bind(data.terms_template.as_deref().unwrap_or(DEFAULT_TERMS_TEMPLATE))
            .bind(data.valid_until.flatten())
            .bind(text(&data.notes))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = $1");

        sqlx::query_as::<_, Quotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {QUOTATION_COLUMNS} FROM quotations ORDER BY created_at DESC");

        sqlx::query_as::<_, Quotation>(&query).fetch_all(pool).await
    }

    fn update_patch(data: QuotationInput) -> Patch<'static> {
        let number = data.chosen_number().map(str::to_string);
        let not_blank = |v: Option<String>| v.filter(|v| !v.trim().is_empty());

        let mut patch = Patch::new("quotations");
        patch
            .set("quote_number", number)
            .set("client_name", data.client_name)
            .set("client_email", data.client_email)
            .set("client_phone", data.client_phone)
            .set("client_address", data.client_address)
            .set("job_title", data.job_title)
            .set("job_location", data.job_location)
            .set("items", data.items)
            .set("total", data.total)
            .set("status", not_blank(data.status))
            .set("terms_template", not_blank(data.terms_template))
            .set("valid_until", data.valid_until)
            .set("notes", data.notes);
        patch
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: QuotationInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = Self::update_patch(data).finish(id, QUOTATION_COLUMNS);
        let quotation = query.build_query_as::<Quotation>().fetch_optional(pool).await?;

        Ok(quotation)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quotations WHERE id = $1")
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
    fn test_generate_quote_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let number = generate_quote_number(date);

        assert!(number.starts_with("QT-20250314-"));
        assert_eq!(number.len(), "QT-20250314-0000".len());
        assert!(number[12..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_quotation_input_keeps_items_opaque() {
        let input: QuotationInput = serde_json::from_value(serde_json::json!({
            "clientName": "Acme",
            "items": [{"description": "Roofing", "qty": 2, "unitPrice": 1500}],
            "termsTemplate": "government"
        }))
        .unwrap();

        assert!(input.chosen_number().is_none());
        assert_eq!(input.terms_template.as_deref(), Some("government"));
        assert_eq!(input.items.unwrap()[0]["description"], "Roofing");
    }

    #[test]
    fn test_update_keeps_number_and_clears_validity() {
        let input: QuotationInput = serde_json::from_value(serde_json::json!({
            "quoteNumber": "  ",
            "validUntil": "",
            "jobLocation": null,
            "status": "sent"
        }))
        .unwrap();

        assert_eq!(
            Quotation::update_patch(input).sql(),
            "UPDATE quotations SET updated_at = NOW(), job_location = $1, status = $2, \
             valid_until = $3"
        );
    }
}
