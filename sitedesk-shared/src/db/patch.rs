//! Partial `UPDATE` statements
//!
//! Update inputs carry `Option<T>` per column: `None` leaves the column out
//! of the `SET` list, `Some(value)` writes it. Nullable columns use
//! `Option<Option<T>>`, so `Some(None)` writes NULL.
//!
//! ```
//! use sitedesk_shared::db::patch::Patch;
//!
//! let mut patch = Patch::new("billings");
//! patch.set("notes", Some(None::<String>)).set("status", None::<String>);
//! assert_eq!(patch.sql(), "UPDATE billings SET updated_at = NOW(), notes = $1");
//! ```

use sqlx::{Encode, Postgres, QueryBuilder, Type};
use uuid::Uuid;

pub struct Patch<'a> {
    builder: QueryBuilder<'a, Postgres>,
}

impl<'a> Patch<'a> {
    /// Starts `UPDATE <table> SET updated_at = NOW()`
    pub fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {table} SET updated_at = NOW()")),
        }
    }

    /// Adds `column = $n` when a value was sent
    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            self.builder.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// SQL built so far
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    /// Targets one row by id and returns `columns`
    pub fn finish(mut self, id: Uuid, columns: &str) -> QueryBuilder<'a, Postgres> {
        self.builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(columns);
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_absent_fields_are_skipped() {
        let patch = Patch::new("projects");
        assert_eq!(patch.sql(), "UPDATE projects SET updated_at = NOW()");
    }

    #[test]
    fn test_present_fields_bind_in_order() {
        let mut patch = Patch::new("task_reminders");
        patch
            .set("title", Some("Order rebar".to_string()))
            .set("deadline", Some(None::<NaiveDate>))
            .set("project_id", None::<Option<Uuid>>);

        let query = patch.finish(Uuid::nil(), "id, title");
        assert_eq!(
            query.sql(),
            "UPDATE task_reminders SET updated_at = NOW(), title = $1, deadline = $2 \
             WHERE id = $3 RETURNING id, title"
        );
    }
}
