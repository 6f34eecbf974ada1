use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::commission::{CommissionService, CommissionSummary};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct CommissionQuery {
    /// Overrides the configured qualifying-fee threshold for one request.
    pub threshold: Option<f64>,
}

pub async fn commission_summary(
    State(state): State<AppState>,
    Query(query): Query<CommissionQuery>,
) -> Result<ResponseJson<ApiResponse<CommissionSummary>>, ApiError> {
    let threshold = query
        .threshold
        .unwrap_or(state.config.commission_threshold);
    if threshold < 0.0 {
        return Err(ApiError::Validation(
            "threshold must not be negative".to_string(),
        ));
    }

    let summary = CommissionService::summary(&state.db.pool, threshold).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/commissions", get(commission_summary))
}
