/// Profile endpoints
///
/// - `GET /api/profile?userId=` the user's own record
/// - `PUT /api/profile` contact details and an optional password change
///
/// Both act on `userId` when given, otherwise on the caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitedesk_shared::{
    auth::credentials::{check_password_change, FALLBACK_USERNAME},
    format::{is_valid_email, is_valid_phone},
    models::{
        de,
        user::{UpdateUser, User},
    },
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub user_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,

    #[serde(skip_serializing)]
    pub current_password: Option<String>,
    #[serde(skip_serializing)]
    pub new_password: Option<String>,
    #[serde(skip_serializing)]
    pub confirm_password: Option<String>,
}

impl ProfileUpdate {
    /// Any password field filled in means a password change was asked for
    pub fn wants_password_change(&self) -> bool {
        [&self.current_password, &self.new_password, &self.confirm_password]
            .iter()
            .any(|p| p.as_deref().is_some_and(|p| !p.is_empty()))
    }

    /// Rejects malformed contact details
    pub fn check(&self) -> ApiResult<()> {
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !is_valid_email(email) {
                return Err(ApiError::BadRequest("Invalid email address".to_string()));
            }
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if !is_valid_phone(phone) {
                return Err(ApiError::BadRequest("Invalid phone number".to_string()));
            }
        }
        Ok(())
    }

    fn contact_changes(&self) -> UpdateUser {
        let clean = |v: &Option<String>| v.as_deref().map(str::trim).map(str::to_string);
        UpdateUser {
            full_name: clean(&self.full_name),
            email: clean(&self.email),
            phone: clean(&self.phone),
            position: clean(&self.position),
            ..Default::default()
        }
    }
}

fn target_user(requested: Option<Uuid>, actor: &Actor) -> ApiResult<Uuid> {
    requested
        .or(actor.user_id)
        .ok_or_else(|| ApiError::missing_fields(&["userId"]))
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub async fn get_profile(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        let user_id = query.user_id.or(actor.user_id).unwrap_or(Uuid::nil());
        return Ok(Json(json!({
            "id": user_id,
            "username": actor.username.as_deref().unwrap_or(FALLBACK_USERNAME),
            "fullName": "Administrator",
            "position": null,
            "email": null,
            "phone": null,
        }))
        .into_response());
    };

    let user_id = target_user(query.user_id, &actor)?;
    let user = User::find_by_id(db, user_id).await?.ok_or_else(not_found)?;

    Ok(Json(user).into_response())
}

pub async fn update_profile(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ProfileUpdate>,
) -> ApiResult<Response> {
    req.check()?;

    let Some(db) = &state.db else {
        let user_id = req.user_id.or(actor.user_id).unwrap_or(Uuid::nil());
        return Ok(stub::updated(user_id, &req).into_response());
    };

    let user_id = target_user(req.user_id, &actor)?;
    let user = User::find_by_id(db, user_id).await?.ok_or_else(not_found)?;

    let mut changes = req.contact_changes();
    if req.wants_password_change() {
        let new_password = check_password_change(
            &user,
            req.current_password.as_deref(),
            req.new_password.as_deref(),
            req.confirm_password.as_deref(),
        )?;
        changes.password = Some(new_password.to_string());
    }

    if changes.is_empty() {
        return Ok(Json(user).into_response());
    }

    let password_changed = changes.password.is_some();
    let updated = User::update(db, user_id, changes).await?.ok_or_else(not_found)?;

    tracing::info!(%user_id, password_changed, "Profile updated");

    Ok(Json(updated).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_change_detection() {
        let plain: ProfileUpdate =
            serde_json::from_value(json!({ "fullName": "Ana Reyes", "newPassword": "" })).unwrap();
        assert!(!plain.wants_password_change());

        let change: ProfileUpdate =
            serde_json::from_value(json!({ "currentPassword": "old", "newPassword": "new" })).unwrap();
        assert!(change.wants_password_change());
    }

    #[test]
    fn test_contact_check() {
        let bad_email: ProfileUpdate = serde_json::from_value(json!({ "email": "nope" })).unwrap();
        assert!(bad_email.check().is_err());

        let ok: ProfileUpdate = serde_json::from_value(json!({
            "email": "ana@example.com",
            "phone": "+63 917 555 0101",
            "userId": ""
        }))
        .unwrap();
        assert!(ok.check().is_ok());
        assert!(ok.user_id.is_none());
    }

    #[test]
    fn test_passwords_never_echoed() {
        let req = ProfileUpdate {
            new_password: Some("secret".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("newPassword").is_none());
    }

    #[test]
    fn test_target_user_requires_someone() {
        assert!(target_user(None, &Actor::anonymous()).is_err());
        let id = Uuid::new_v4();
        assert_eq!(target_user(Some(id), &Actor::anonymous()).unwrap(), id);
    }
}
