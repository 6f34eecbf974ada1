//! Landing-page counters.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use chrono::Utc;
use db::models::{care_staff::CareStaff, customer::Customer, service_record::ServiceRecord};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::{response::ApiResponse, time::month_key};

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardSummary {
    pub customer_count: i64,
    pub active_staff_count: i64,
    pub month: String,
    pub month_visit_count: i64,
    pub month_fee_total: f64,
    pub month_profit_total: f64,
}

pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    let month = month_key(Utc::now().date_naive());

    let customer_count = Customer::count(&state.db.pool).await?;
    let active_staff_count = CareStaff::count_active(&state.db.pool).await?;
    let (month_visit_count, month_fee_total, month_profit_total) =
        ServiceRecord::month_totals(&state.db.pool, &month).await?;

    Ok(ResponseJson(ApiResponse::success(DashboardSummary {
        customer_count,
        active_staff_count,
        month,
        month_visit_count,
        month_fee_total,
        month_profit_total,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_summary))
}
