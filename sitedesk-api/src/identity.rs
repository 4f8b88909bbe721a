/// Caller identity
///
/// Every handler that needs to know who is calling takes an [`Actor`]. It is
/// resolved in this order:
///
/// 1. `Authorization: Bearer <session token>`; a bad token is a 401
/// 2. `x-user-id` / `x-username` headers, if `TRUST_IDENTITY_HEADERS` is on
/// 3. anonymous

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use sitedesk_shared::{auth::session, models::task_reminder::TaskReminder};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";

/// Name written to `last_edited_by` when the caller gave none
pub const DEFAULT_ACTOR_NAME: &str = "Admin";

/// Where the identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorSource {
    Session,
    Headers,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub source: ActorSource,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            username: None,
            source: ActorSource::Anonymous,
        }
    }

    /// Name used for audit stamps
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_ACTOR_NAME)
    }

    /// Resolves identity from request headers
    pub fn from_headers(
        headers: &HeaderMap,
        secret: &str,
        trust_identity_headers: bool,
    ) -> Result<Self, ApiError> {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

            let claims = session::validate_token(token.trim(), secret)?;
            return Ok(Self {
                user_id: Some(claims.sub),
                username: Some(claims.username),
                source: ActorSource::Session,
            });
        }

        if !trust_identity_headers {
            return Ok(Self::anonymous());
        }

        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header_str(USER_ID_HEADER)
            .map(|v| {
                Uuid::parse_str(v)
                    .map_err(|_| ApiError::Unauthorized("Invalid x-user-id header".to_string()))
            })
            .transpose()?;
        let username = header_str(USERNAME_HEADER).map(str::to_string);

        if user_id.is_none() && username.is_none() {
            return Ok(Self::anonymous());
        }

        Ok(Self {
            user_id,
            username,
            source: ActorSource::Headers,
        })
    }

    /// Checks that this caller may modify `reminder`
    ///
    /// Identified callers must be the creator. Anonymous callers pass only
    /// when `anonymous_writes` is enabled.
    pub fn ensure_reminder_owner(
        &self,
        reminder: &TaskReminder,
        anonymous_writes: bool,
    ) -> Result<(), ApiError> {
        match self.user_id {
            Some(user_id) if reminder.is_owned_by(user_id) => Ok(()),
            Some(_) => Err(ApiError::Forbidden(
                "Only the creator can modify this reminder".to_string(),
            )),
            None if anonymous_writes => Ok(()),
            None => Err(ApiError::Unauthorized(
                "Sign in to modify reminders".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Actor::from_headers(
            &parts.headers,
            state.session_secret(),
            state.config.access.trust_identity_headers,
        )
    }
}
