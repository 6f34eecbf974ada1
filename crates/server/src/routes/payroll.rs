use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::payroll::{PayrollService, PayrollSummary};
use utils::{
    response::ApiResponse,
    time::{month_key, parse_month_key},
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct PayrollQuery {
    /// Restrict to one month ("YYYY-MM"); all months when absent.
    pub month: Option<String>,
}

pub async fn payroll_summaries(
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<PayrollSummary>>>, ApiError> {
    // Re-key through the date so an unpadded month like `2024-5` still
    // matches the zero-padded buckets.
    let month = query
        .month
        .as_deref()
        .map(|raw| {
            parse_month_key(raw)
                .map(month_key)
                .ok_or_else(|| ApiError::Validation(format!("invalid month: {raw}")))
        })
        .transpose()?;

    let summaries = PayrollService::summaries(&state.db.pool, month.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(summaries)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/payroll", get(payroll_summaries))
}
