//! Printable reports and the column-picking export endpoint.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use db::models::service_record::{ServiceRecord, ServiceRecordFilter};
use serde::Deserialize;
use services::services::{
    commission::CommissionService,
    report::{ExportFormat, parse_columns},
};

use crate::{AppState, error::ApiError};

pub async fn service_report(
    State(state): State<AppState>,
    Query(filter): Query<ServiceRecordFilter>,
) -> Result<Html<String>, ApiError> {
    let rows = ServiceRecord::list_views(&state.db.pool, &filter).await?;
    let html = state
        .reports
        .render_service_report(&rows, filter.from, filter.to)?;
    Ok(Html(html))
}

pub async fn commission_report(
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let summary =
        CommissionService::summary(&state.db.pool, state.config.commission_threshold).await?;
    let html = state.reports.render_commission_report(&summary)?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub columns: Vec<String>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(flatten)]
    pub filter: ServiceRecordFilter,
}

pub async fn export_service_records(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let columns = parse_columns(&payload.columns)?;
    let rows = ServiceRecord::list_views(&state.db.pool, &payload.filter).await?;
    let file = state.reports.export_records(&columns, &rows, payload.format)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file.content_type),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );
    Ok((headers, file.body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/services", get(service_report))
        .route("/reports/commissions", get(commission_report))
        .route("/reports/export", post(export_service_records))
}
