/// Quote request endpoints
///
/// `POST` is the public website form; everything else is admin-side.
///
/// - `GET /api/quote-requests?status=pending`
/// - `POST /api/quote-requests` (name, email, phone, serviceType, message required)
/// - `GET /api/quote-requests/:id`
/// - `PUT /api/quote-requests/:id` `{ "status", "reviewedBy"? }`
/// - `DELETE /api/quote-requests/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    identity::Actor,
    routes::stub,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sitedesk_shared::models::quote_request::{CreateQuoteRequest, QuoteRequest, STATUS_PENDING};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Quote request not found".to_string())
}

pub async fn list_quote_requests(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    let status = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    Ok(Json(QuoteRequest::list(db, status).await?).into_response())
}

pub async fn get_quote_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    Ok(Json(QuoteRequest::find_by_id(db, id).await?.ok_or_else(not_found)?).into_response())
}

pub async fn create_quote_request(
    State(state): State<AppState>,
    Json(req): Json<CreateQuoteRequest>,
) -> ApiResult<Response> {
    let missing = req.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(&missing));
    }

    let Some(db) = &state.db else {
        let (status, Json(mut record)) = stub::created(&req);
        record["status"] = json!(STATUS_PENDING);
        return Ok((status, Json(record)).into_response());
    };

    let request = QuoteRequest::create(db, req).await?;
    tracing::info!(
        quote_request_id = %request.id,
        service_type = %request.service_type,
        "Quote request received"
    );

    Ok((StatusCode::CREATED, Json(request)).into_response())
}

/// Changes the status; leaving `pending` records the reviewer
pub async fn update_quote_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Response> {
    let Some(status) = update
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Err(ApiError::missing_fields(&["status"]));
    };

    let reviewer = update
        .reviewed_by
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| actor.display_name());

    let Some(db) = &state.db else {
        let Json(mut record) = stub::updated(id, &json!({ "status": status }));
        if status != STATUS_PENDING {
            record["reviewedBy"] = json!(reviewer);
            record["reviewedAt"] = json!(Utc::now());
        }
        return Ok(Json(record).into_response());
    };

    let request = QuoteRequest::update_status(db, id, status, reviewer)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(request).into_response())
}

pub async fn delete_quote_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    if !QuoteRequest::delete(db, id).await? {
        return Err(not_found());
    }

    Ok(stub::success())
}
