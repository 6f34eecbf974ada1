//! Document upload, download and removal for care-staff records.
//!
//! Files land in the [`DocumentStore`]; the staff row only carries their
//! public URLs, so uploads and deletes always touch both.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::care_staff::{CareStaff, MAX_CERTIFICATES};
use services::services::documents::{DocumentError, DocumentKind, MAX_FILE_SIZE, StoredDocument};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn list_documents(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<StoredDocument>>>, ApiError> {
    CareStaff::find_by_id(&state.db.pool, staff_id)
        .await?
        .ok_or(ApiError::NotFound("care staff"))?;

    let documents = state.documents.list(staff_id).await?;
    Ok(ResponseJson(ApiResponse::success(documents)))
}

pub async fn upload_document(
    State(state): State<AppState>,
    Path(staff_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<StoredDocument>>, ApiError> {
    let staff = CareStaff::find_by_id(&state.db.pool, staff_id)
        .await?
        .ok_or(ApiError::NotFound("care staff"))?;

    let mut kind: Option<DocumentKind> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("kind") => {
                let raw = field.text().await?;
                kind = Some(raw.parse().map_err(|_| {
                    ApiError::Validation(format!("unknown document kind: {raw}"))
                })?);
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .ok_or_else(|| ApiError::Validation("file name is required".to_string()))?
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let kind =
        kind.ok_or_else(|| ApiError::Validation("missing \"kind\" field".to_string()))?;
    let (name, bytes) =
        file.ok_or_else(|| ApiError::Validation("missing \"file\" field".to_string()))?;

    if kind == DocumentKind::Certificate && staff.certificate_urls.len() >= MAX_CERTIFICATES {
        return Err(ApiError::Validation(format!(
            "at most {MAX_CERTIFICATES} certificates per staff member"
        )));
    }

    let stored = state.documents.save(staff_id, &name, &bytes).await?;

    let mut certificate_urls = staff.certificate_urls.clone();
    let mut id_copy_url = staff.id_copy_url.clone();
    match kind {
        DocumentKind::Certificate => certificate_urls.push(stored.url.clone()),
        DocumentKind::IdCopy => {
            // A new HKID copy replaces the previous one on disk as well.
            if let Some(old) = id_copy_url.as_deref()
                && let Some(old_name) = old.rsplit('/').next()
                && state.documents.delete(staff_id, old_name).await.is_ok()
            {
                tracing::debug!(%staff_id, old_name, "replaced previous id copy");
            }
            id_copy_url = Some(stored.url.clone());
        }
    }
    CareStaff::update_documents(
        &state.db.pool,
        staff_id,
        &certificate_urls,
        id_copy_url.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(stored)))
}

pub async fn download_document(
    State(state): State<AppState>,
    Path((staff_id, name)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.documents.read(staff_id, &name).await?;

    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref())
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    Ok((StatusCode::OK, headers, bytes))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path((staff_id, name)): Path<(Uuid, String)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let staff = CareStaff::find_by_id(&state.db.pool, staff_id)
        .await?
        .ok_or(ApiError::NotFound("care staff"))?;

    // A missing file is fine: the row may still carry a stale URL from an
    // interrupted earlier delete, and scrubbing it is the point.
    match state.documents.delete(staff_id, &name).await {
        Ok(()) | Err(DocumentError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    // Drop the matching URL from whichever column referenced it.
    let url = format!("/api/care-staff/{staff_id}/documents/{name}");
    let certificate_urls: Vec<String> = staff
        .certificate_urls
        .into_iter()
        .filter(|u| u != &url)
        .collect();
    let id_copy_url = staff.id_copy_url.filter(|u| u != &url);
    CareStaff::update_documents(
        &state.db.pool,
        staff_id,
        &certificate_urls,
        id_copy_url.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/care-staff/{id}/documents",
            get(list_documents).post(upload_document),
        )
        .route(
            "/care-staff/{id}/documents/{name}",
            get(download_document).delete(delete_document),
        )
        // Room for the file plus the multipart framing.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024))
}
