//! Routes for the clients screen: customer CRUD with server-generated codes.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::customer::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

use super::{require_name, require_phone};

pub async fn list_customers(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Customer>>>, ApiError> {
    let customers = Customer::list(&state.db.pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(customers)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCustomer>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    require_name(&payload.name)?;
    require_phone(&payload.phone)?;

    let customer = Customer::create(&state.db.pool, &payload).await?;
    tracing::info!(customer_id = %customer.id, code = %customer.code, "customer created");
    Ok(ResponseJson(ApiResponse::success(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    let customer = Customer::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("customer"))?;
    Ok(ResponseJson(ApiResponse::success(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCustomer>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    require_name(&payload.name)?;
    require_phone(&payload.phone)?;

    let customer = Customer::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("customer"))?;
    Ok(ResponseJson(ApiResponse::success(customer)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Customer::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("customer"));
    }
    tracing::info!(customer_id = %id, "customer deleted");
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}
