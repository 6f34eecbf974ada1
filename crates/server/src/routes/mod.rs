pub mod care_staff;
pub mod commission_rates;
pub mod commissions;
pub mod customers;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod payroll;
pub mod reports;
pub mod service_records;

use axum::Router;

use crate::{AppState, error::ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(customers::router())
        .merge(care_staff::router())
        .merge(documents::router())
        .merge(service_records::router())
        .merge(commission_rates::router())
        .merge(commissions::router())
        .merge(payroll::router())
        .merge(dashboard::router())
        .merge(reports::router())
}

/// Phone numbers are local 8-digit numbers.
pub(crate) fn require_phone(phone: &str) -> Result<(), ApiError> {
    if phone.len() != 8 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "phone must be exactly 8 digits".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    Ok(())
}
