/// Employee management endpoints
///
/// Employees are rows of `users`. Usernames are unique through the table
/// constraint; a clash on create or rename is a 400.
///
/// - `GET /api/employees`
/// - `POST /api/employees`
/// - `GET /api/employees/:id`
/// - `PUT /api/employees/:id`
/// - `DELETE /api/employees/:id` (not your own account)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitedesk_shared::{
    db::is_unique_violation,
    format,
    models::user::{CreateUser, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Employee body for create and update
///
/// The password is accepted but never echoed back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Username must be at most 100 characters"))]
    pub username: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<String>,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub employee_id: Option<String>,
}

impl EmployeeRequest {
    /// Trims every field and drops blanks
    fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Self {
            username: clean(self.username),
            // passwords are taken as typed
            password: self.password.filter(|p| !p.is_empty()),
            full_name: clean(self.full_name),
            position: clean(self.position),
            email: clean(self.email),
            phone: clean(self.phone),
            employee_id: clean(self.employee_id),
        }
    }

    fn check(&self) -> ApiResult<()> {
        self.validate().map_err(ApiError::from_validation)?;

        if let Some(phone) = &self.phone {
            if !format::is_valid_phone(phone) {
                return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "phone".to_string(),
                    message: "Invalid phone number".to_string(),
                }]));
            }
        }

        Ok(())
    }
}

fn duplicate_username(err: sqlx::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::BadRequest("Username already exists".to_string())
    } else {
        err.into()
    }
}

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    Ok(Json(User::list(db).await?).into_response())
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    let user = User::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(Json(user).into_response())
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(req): Json<EmployeeRequest>,
) -> ApiResult<Response> {
    let req = req.normalized();
    req.check()?;

    let (Some(username), Some(password)) = (req.username.clone(), req.password.clone()) else {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    };

    let Some(db) = &state.db else {
        return Ok(stub::created(&req).into_response());
    };

    let user = User::create(
        db,
        CreateUser {
            username,
            password,
            full_name: req.full_name,
            position: req.position,
            email: req.email,
            phone: req.phone,
            employee_id: req.employee_id,
        },
    )
    .await
    .map_err(duplicate_username)?;

    tracing::info!(user_id = %user.id, username = %user.username, "Employee created");

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EmployeeRequest>,
) -> ApiResult<Response> {
    let req = req.normalized();
    req.check()?;

    let Some(db) = &state.db else {
        return Ok(stub::updated(id, &req).into_response());
    };

    let changes = UpdateUser {
        username: req.username,
        password: req.password,
        full_name: req.full_name,
        position: req.position,
        email: req.email,
        phone: req.phone,
        employee_id: req.employee_id,
    };

    let updated = if changes.is_empty() {
        User::find_by_id(db, id).await?
    } else {
        User::update(db, id, changes).await.map_err(duplicate_username)?
    };
    let user = updated.ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(Json(user).into_response())
}

pub async fn delete_employee(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if actor.user_id == Some(id) {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    if !User::delete(db, id).await? {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %actor.display_name(), "Employee deleted");

    Ok(stub::success())
}
