//! Commission terms per introducer. Upsert keyed on the introducer name so
//! the settings screen can save without caring whether a row exists yet.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::commission_rate::{CommissionRate, UpsertCommissionRate};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn list_commission_rates(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<CommissionRate>>>, ApiError> {
    let rates = CommissionRate::list(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(rates)))
}

pub async fn upsert_commission_rate(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<UpsertCommissionRate>,
) -> Result<ResponseJson<ApiResponse<CommissionRate>>, ApiError> {
    if payload.introducer.trim().is_empty() {
        return Err(ApiError::Validation("introducer is required".to_string()));
    }
    if payload.first_month_amount < 0.0 || payload.subsequent_month_amount < 0.0 {
        return Err(ApiError::Validation(
            "commission amounts must not be negative".to_string(),
        ));
    }
    if let Some(pct) = payload.voucher_rate_pct
        && !(0.0..=100.0).contains(&pct)
    {
        return Err(ApiError::Validation(
            "voucher rate must be between 0 and 100".to_string(),
        ));
    }

    let rate = CommissionRate::create_or_update(&state.db.pool, &payload).await?;
    tracing::info!(introducer = %rate.introducer, "commission rate saved");
    Ok(ResponseJson(ApiResponse::success(rate)))
}

pub async fn get_commission_rate(
    State(state): State<AppState>,
    Path(introducer): Path<String>,
) -> Result<ResponseJson<ApiResponse<CommissionRate>>, ApiError> {
    let rate = CommissionRate::find_by_introducer(&state.db.pool, &introducer)
        .await?
        .ok_or(ApiError::NotFound("commission rate"))?;
    Ok(ResponseJson(ApiResponse::success(rate)))
}

pub async fn delete_commission_rate(
    State(state): State<AppState>,
    Path(introducer): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = CommissionRate::delete_by_introducer(&state.db.pool, &introducer).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("commission rate"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/commission-rates",
            get(list_commission_rates).put(upsert_commission_rate),
        )
        .route(
            "/commission-rates/{introducer}",
            get(get_commission_rate).delete(delete_commission_rate),
        )
}
