/// Authentication endpoints
///
/// - `POST /api/auth/login` - check credentials, get a session token
/// - `GET /api/auth/session` - who does this token belong to
///
/// Login failures all answer `401 Invalid username or password`, whether the
/// user is unknown or the password is wrong.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::{Actor, ActorSource},
};
use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sitedesk_shared::{
    auth::{credentials, session},
    models::user::{User, UserSummary},
};
use uuid::Uuid;

/// Missing fields deserialize as empty and fail like a wrong password
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserSummary,

    /// Bearer token for subsequent requests
    pub token: String,

    /// Seconds until the token expires
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = match &state.db {
        Some(db) => {
            let user = User::find_by_username(db, req.username.trim()).await?;
            let user = credentials::verify_login(user, &req.password).map_err(|e| {
                tracing::info!(username = %req.username, "Rejected login");
                ApiError::from(e)
            })?;
            UserSummary::from(&user)
        }
        None => {
            let id = credentials::verify_fallback_login(&req.username, &req.password)?;
            UserSummary {
                id,
                username: req.username.clone(),
                full_name: Some("Administrator".to_string()),
                position: None,
            }
        }
    };

    let ttl = Duration::hours(state.config.session.ttl_hours);
    let claims = session::Claims::new(user.id, user.username.clone(), ttl);
    let token = session::create_token(&claims, state.session_secret())?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        user,
        token,
        expires_in: ttl.num_seconds(),
    }))
}

/// Only a verified session token counts here; identity headers do not
pub async fn session(actor: Actor) -> ApiResult<Json<SessionResponse>> {
    match (actor.source, actor.user_id, actor.username) {
        (ActorSource::Session, Some(id), Some(username)) => Ok(Json(SessionResponse {
            success: true,
            user: SessionUser { id, username },
        })),
        _ => Err(ApiError::Unauthorized("No active session".to_string())),
    }
}
