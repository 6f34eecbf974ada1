//! Routes for the care-staff screen.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::care_staff::{CareStaff, CareStaffFilter, CreateCareStaff, UpdateCareStaff};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

use super::{require_name, require_phone};

pub async fn list_care_staff(
    State(state): State<AppState>,
    Query(filter): Query<CareStaffFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<CareStaff>>>, ApiError> {
    let staff = CareStaff::list(&state.db.pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(staff)))
}

pub async fn create_care_staff(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCareStaff>,
) -> Result<ResponseJson<ApiResponse<CareStaff>>, ApiError> {
    require_name(&payload.name)?;
    require_phone(&payload.phone)?;

    let staff = CareStaff::create(&state.db.pool, &payload).await?;
    tracing::info!(staff_id = %staff.id, "care staff created");
    Ok(ResponseJson(ApiResponse::success(staff)))
}

pub async fn get_care_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CareStaff>>, ApiError> {
    let staff = CareStaff::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("care staff"))?;
    Ok(ResponseJson(ApiResponse::success(staff)))
}

pub async fn update_care_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCareStaff>,
) -> Result<ResponseJson<ApiResponse<CareStaff>>, ApiError> {
    require_name(&payload.name)?;
    require_phone(&payload.phone)?;

    let staff = CareStaff::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("care staff"))?;
    Ok(ResponseJson(ApiResponse::success(staff)))
}

pub async fn delete_care_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = CareStaff::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("care staff"));
    }
    tracing::info!(staff_id = %id, "care staff deleted");
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/care-staff", get(list_care_staff).post(create_care_staff))
        .route(
            "/care-staff/{id}",
            get(get_care_staff)
                .put(update_care_staff)
                .delete(delete_care_staff),
        )
}
