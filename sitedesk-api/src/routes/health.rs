/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "connections": { "active": 1, "idle": 4 }
/// }
/// ```
///
/// `database` is `connected`, `disconnected` or `not_configured`. Fallback
/// mode is healthy; a configured but unreachable database is `degraded`.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sitedesk_shared::db::pool;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionStats {
    pub active: usize,
    pub idle: usize,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match &state.db {
        None => "not_configured",
        Some(db) => match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "disconnected"
            }
        },
    };

    Ok(Json(HealthResponse {
        status: if database == "disconnected" {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        connections: state.db.as_ref().map(|db| {
            let stats = pool::get_pool_stats(db);
            ConnectionStats {
                active: stats.active_connections,
                idle: stats.idle_connections,
            }
        }),
    }))
}
