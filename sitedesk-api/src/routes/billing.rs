/// Billing endpoints
///
/// `amount` accepts numbers or typed money strings; `"$1,234.56abc"` is
/// stored as `1234.56` and anything without digits as `0`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::stub,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use sitedesk_shared::models::billing::{Billing, BillingInput, DEFAULT_STATUS};
use uuid::Uuid;

fn not_found() -> ApiError {
    ApiError::NotFound("Billing record not found".to_string())
}

pub async fn list_billings(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    Ok(Json(Billing::list(db).await?).into_response())
}

pub async fn get_billing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    Ok(Json(Billing::find_by_id(db, id).await?.ok_or_else(not_found)?).into_response())
}

pub async fn create_billing(
    State(state): State<AppState>,
    Json(mut input): Json<BillingInput>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        input.amount = Some(input.amount.unwrap_or(0.0));
        input.status = Some(input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()));
        return Ok(stub::created(&input).into_response());
    };

    let billing = Billing::create(db, input).await?;
    tracing::info!(
        billing_id = %billing.id,
        amount = billing.amount,
        "Billing record created"
    );

    Ok((StatusCode::CREATED, Json(billing)).into_response())
}

pub async fn update_billing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BillingInput>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(stub::updated(id, &input).into_response());
    };

    let billing = Billing::update(db, id, input).await?.ok_or_else(not_found)?;
    Ok(Json(billing).into_response())
}

pub async fn delete_billing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    if !Billing::delete(db, id).await? {
        return Err(not_found());
    }

    Ok(stub::success())
}
