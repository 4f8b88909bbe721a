/// Quotation endpoints
///
/// `items` is stored exactly as sent. A quotation created without a
/// `quoteNumber` gets one like `QT-20250314-0427`.

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
use chrono::Utc;
use serde_json::Value;
use sitedesk_shared::{
    db::is_unique_violation,
    models::quotation::{
        generate_quote_number, Quotation, QuotationInput, DEFAULT_STATUS, DEFAULT_TERMS_TEMPLATE,
    },
};
use uuid::Uuid;

fn not_found() -> ApiError {
    ApiError::NotFound("Quotation not found".to_string())
}

fn duplicate_number(err: sqlx::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::BadRequest("Quote number already exists".to_string())
    } else {
        err.into()
    }
}

pub async fn list_quotations(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Vec::<Value>::new()).into_response());
    };

    Ok(Json(Quotation::list(db).await?).into_response())
}

pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(Json(Value::Null).into_response());
    };

    Ok(Json(Quotation::find_by_id(db, id).await?.ok_or_else(not_found)?).into_response())
}

pub async fn create_quotation(
    State(state): State<AppState>,
    Json(mut input): Json<QuotationInput>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        if input.quote_number.as_deref().map_or(true, |n| n.trim().is_empty()) {
            input.quote_number = Some(generate_quote_number(Utc::now().date_naive()));
        }
        input.status.get_or_insert_with(|| DEFAULT_STATUS.to_string());
        input
            .terms_template
            .get_or_insert_with(|| DEFAULT_TERMS_TEMPLATE.to_string());
        return Ok(stub::created(&input).into_response());
    };

    let quotation = Quotation::create(db, input).await.map_err(duplicate_number)?;
    tracing::info!(quotation_id = %quotation.id, quote_number = %quotation.quote_number, "Quotation created");

    Ok((StatusCode::CREATED, Json(quotation)).into_response())
}

pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<QuotationInput>,
) -> ApiResult<Response> {
    let Some(db) = &state.db else {
        return Ok(stub::updated(id, &input).into_response());
    };

    let quotation = Quotation::update(db, id, input)
        .await
        .map_err(duplicate_number)?
        .ok_or_else(not_found)?;

    Ok(Json(quotation).into_response())
}

pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let Some(db) = &state.db else {
        return Ok(stub::success());
    };

    if !Quotation::delete(db, id).await? {
        return Err(not_found());
    }

    Ok(stub::success())
}
