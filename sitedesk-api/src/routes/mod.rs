/// API route handlers, one module per resource
///
/// Every handler checks `AppState::db` first; without a database it answers
/// from [`stub`] instead of failing.

pub mod auth;
pub mod billing;
pub mod employees;
pub mod health;
pub mod profile;
pub mod project_tasks;
pub mod projects;
pub mod quotations;
pub mod quote_requests;
pub mod reminder_completions;
pub mod reminder_tags;
pub mod stub;
pub mod task_reminders;
