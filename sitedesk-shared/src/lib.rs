//! # SiteDesk Shared Library
//!
//! Data layer and domain helpers used by the SiteDesk API server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, migrations, error classification
//! - `models`: table rows and their queries
//! - `auth`: credential checks and session tokens
//! - `format`: currency/date formatting and input sanitizing

pub mod auth;
pub mod db;
pub mod format;
pub mod models;

/// Current version of the SiteDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
