/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
/// - `patch`: partial `UPDATE` builder
///
/// Row models and their queries live in the crate-level `models` module.

pub mod migrations;
pub mod patch;
pub mod pool;

/// Returns true when the error is a unique-constraint violation
///
/// Handlers use this to turn duplicate inserts into domain answers
/// (duplicate username, repeated completion) instead of 500s.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
