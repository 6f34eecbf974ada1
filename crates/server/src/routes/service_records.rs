//! Routes for the billing screen: service record CRUD over the joined view.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    care_staff::CareStaff,
    customer::Customer,
    service_record::{ServiceRecord, ServiceRecordFilter, ServiceRecordForm, ServiceRecordView},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The form references rows the client may have deleted in another tab, so
/// both foreign keys are checked up front for a friendlier error than the
/// constraint failure.
async fn check_references(state: &AppState, form: &ServiceRecordForm) -> Result<(), ApiError> {
    Customer::find_by_id(&state.db.pool, form.customer_id)
        .await?
        .ok_or(ApiError::NotFound("customer"))?;
    if let Some(staff_id) = form.staff_id {
        CareStaff::find_by_id(&state.db.pool, staff_id)
            .await?
            .ok_or(ApiError::NotFound("care staff"))?;
    }
    Ok(())
}

pub async fn list_service_records(
    State(state): State<AppState>,
    Query(filter): Query<ServiceRecordFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<ServiceRecordView>>>, ApiError> {
    let records = ServiceRecord::list_views(&state.db.pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(records)))
}

pub async fn create_service_record(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ServiceRecordForm>,
) -> Result<ResponseJson<ApiResponse<ServiceRecord>>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    check_references(&state, &payload).await?;

    let record = ServiceRecord::create(&state.db.pool, &payload).await?;
    tracing::info!(record_id = %record.id, customer_id = %record.customer_id, "service record created");
    Ok(ResponseJson(ApiResponse::success(record)))
}

pub async fn get_service_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ServiceRecord>>, ApiError> {
    let record = ServiceRecord::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("service record"))?;
    Ok(ResponseJson(ApiResponse::success(record)))
}

pub async fn update_service_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ServiceRecordForm>,
) -> Result<ResponseJson<ApiResponse<ServiceRecord>>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    check_references(&state, &payload).await?;

    let record = ServiceRecord::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("service record"))?;
    Ok(ResponseJson(ApiResponse::success(record)))
}

pub async fn delete_service_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = ServiceRecord::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("service record"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/service-records",
            get(list_service_records).post(create_service_record),
        )
        .route(
            "/service-records/{id}",
            get(get_service_record)
                .put(update_service_record)
                .delete(delete_service_record),
        )
}
