use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    commission::CommissionError, documents::DocumentError, payroll::PayrollError,
    report::ReportError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Commission(#[from] CommissionError),
    #[error(transparent)]
    Payroll(#[from] PayrollError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Report(ReportError::UnknownColumn(_) | ReportError::NoColumns) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Document(
                DocumentError::InvalidFilename(_) | DocumentError::EmptyFile | DocumentError::TooLarge,
            ) => StatusCode::BAD_REQUEST,
            ApiError::Document(DocumentError::NotFound(_)) | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
