pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::{documents::DocumentStore, report::ReportService};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub reports: Arc<ReportService>,
    pub documents: Arc<DocumentStore>,
    pub config: Arc<Config>,
}

pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let db = DBService::new(&config.database_url).await?;
    let reports = Arc::new(ReportService::new()?);
    let documents = Arc::new(DocumentStore::new(&config.document_root));
    Ok(AppState {
        db,
        reports,
        documents,
        config: Arc::new(config),
    })
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
