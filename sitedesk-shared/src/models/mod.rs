/// Database models for SiteDesk
///
/// Each module owns one table (or a table family) and its queries. Rows
/// serialize to the camelCase JSON the frontend expects; the `*Input`
/// structs deserialize the same shape back.
///
/// - `user`: staff accounts and login credentials
/// - `project` / `project_task`: projects and their ordered subtasks
/// - `billing`: invoices and payment state
/// - `quotation`: client quotations with opaque line items
/// - `quote_request`: public intake form submissions
/// - `task_reminder`, `reminder_tag`, `reminder_completion`: reminders,
///   who they target, and who has ticked them off

pub mod billing;
pub mod de;
pub mod project;
pub mod project_task;
pub mod quotation;
pub mod quote_request;
pub mod reminder_completion;
pub mod reminder_tag;
pub mod task_reminder;
pub mod user;
