/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every error renders as the same JSON
/// envelope:
///
/// ```json
/// { "success": false, "error": "not_found", "message": "Project not found" }
/// ```
///
/// Database failures also carry the driver's `code` and `hint` so the admin
/// UI can show them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sitedesk_shared::auth::{credentials::CredentialError, session::SessionError};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Database failure (500) with driver details
    Database {
        message: String,
        code: Option<String>,
        hint: Option<String>,
    },

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,

    /// SQLSTATE of a database error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    /// Turns `validator` output into a field list
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }

    /// One error per missing required field
    pub fn missing_fields(fields: &[&str]) -> Self {
        ApiError::ValidationError(
            fields
                .iter()
                .map(|field| ValidationErrorDetail {
                    field: field.to_string(),
                    message: format!("{field} is required"),
                })
                .collect(),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Database { message, .. } => write!(f, "Database error: {}", message),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut code = None;
        let mut hint = None;

        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => {
                let message = match errors.as_slice() {
                    [] => "Request validation failed".to_string(),
                    errors => {
                        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                        format!("Invalid or missing fields: {}", fields.join(", "))
                    }
                };
                (StatusCode::BAD_REQUEST, "validation_error", message, Some(errors))
            }
            ApiError::Database {
                message,
                code: db_code,
                hint: db_hint,
            } => {
                tracing::error!(code = ?db_code, "Database error: {}", message);
                code = db_code;
                hint = db_hint;
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    message,
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message,
            details,
            code,
            hint,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique violations are not special-cased here; handlers that know what a
/// conflict means map it themselves.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let hint = db_err
                    .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                    .and_then(|pg| pg.hint())
                    .map(str::to_string);

                ApiError::Database {
                    message: db_err.message().to_string(),
                    code: db_err.code().map(|c| c.into_owned()),
                    hint,
                }
            }
            other => ApiError::Database {
                message: other.to_string(),
                code: None,
                hint: None,
            },
        }
    }
}

/// Convert session errors to API errors
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => ApiError::Unauthorized("Session expired".to_string()),
            SessionError::Invalid(_) => ApiError::Unauthorized("Invalid session token".to_string()),
            SessionError::CreateError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert credential errors to API errors
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}
