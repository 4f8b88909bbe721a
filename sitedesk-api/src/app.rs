/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use sitedesk_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// // No pool: every handler answers in fallback mode
/// let state = AppState::new(None, config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::security_headers};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; the pool and config are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Database pool; `None` means fallback mode
    pub db: Option<PgPool>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Option<PgPool>, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Whether a database is available
    pub fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /health
/// /api/auth/login                          POST
/// /api/auth/session                        GET
/// /api/employees[/:id]                     GET POST PUT DELETE
/// /api/projects[/:id]                      GET POST PUT DELETE
/// /api/projects/:id/tasks                  GET POST PUT(batch)
/// /api/projects/:id/tasks/:task_id         PUT DELETE
/// /api/billing[/:id]                       GET POST PUT DELETE
/// /api/quotations[/:id]                    GET POST PUT DELETE
/// /api/quote-requests[/:id]                GET POST PUT DELETE
/// /api/task-reminders[/:id]                GET POST PUT DELETE
/// /api/task-reminders/:id/tags             GET POST DELETE
/// /api/task-reminders/:id/complete         POST DELETE
/// /api/profile                             GET PUT
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/session", get(routes::auth::session));

    let employee_routes = Router::new()
        .route(
            "/",
            get(routes::employees::list_employees).post(routes::employees::create_employee),
        )
        .route(
            "/:id",
            get(routes::employees::get_employee)
                .put(routes::employees::update_employee)
                .delete(routes::employees::delete_employee),
        );

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:id/tasks",
            get(routes::project_tasks::list_tasks)
                .post(routes::project_tasks::create_task)
                .put(routes::project_tasks::batch_update_tasks),
        )
        .route(
            "/:id/tasks/:task_id",
            put(routes::project_tasks::update_task).delete(routes::project_tasks::delete_task),
        );

    let billing_routes = Router::new()
        .route(
            "/",
            get(routes::billing::list_billings).post(routes::billing::create_billing),
        )
        .route(
            "/:id",
            get(routes::billing::get_billing)
                .put(routes::billing::update_billing)
                .delete(routes::billing::delete_billing),
        );

    let quotation_routes = Router::new()
        .route(
            "/",
            get(routes::quotations::list_quotations).post(routes::quotations::create_quotation),
        )
        .route(
            "/:id",
            get(routes::quotations::get_quotation)
                .put(routes::quotations::update_quotation)
                .delete(routes::quotations::delete_quotation),
        );

    let quote_request_routes = Router::new()
        .route(
            "/",
            get(routes::quote_requests::list_quote_requests)
                .post(routes::quote_requests::create_quote_request),
        )
        .route(
            "/:id",
            get(routes::quote_requests::get_quote_request)
                .put(routes::quote_requests::update_quote_request)
                .delete(routes::quote_requests::delete_quote_request),
        );

    let reminder_routes = Router::new()
        .route(
            "/",
            get(routes::task_reminders::list_reminders)
                .post(routes::task_reminders::create_reminder),
        )
        .route(
            "/:id",
            get(routes::task_reminders::get_reminder)
                .put(routes::task_reminders::update_reminder)
                .delete(routes::task_reminders::delete_reminder),
        )
        .route(
            "/:id/tags",
            get(routes::reminder_tags::list_tags)
                .post(routes::reminder_tags::add_tags)
                .delete(routes::reminder_tags::remove_tags),
        )
        .route(
            "/:id/complete",
            post(routes::reminder_completions::mark_complete)
                .delete(routes::reminder_completions::unmark_complete),
        );

    let profile_routes = Router::new().route(
        "/",
        get(routes::profile::get_profile).put(routes::profile::update_profile),
    );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/employees", employee_routes)
        .nest("/projects", project_routes)
        .nest("/billing", billing_routes)
        .nest("/quotations", quotation_routes)
        .nest("/quote-requests", quote_request_routes)
        .nest("/task-reminders", reminder_routes)
        .nest("/profile", profile_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(crate::identity::USER_ID_HEADER),
                HeaderName::from_static(crate::identity::USERNAME_HEADER),
            ])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_headers,
        ))
        .with_state(state)
}
