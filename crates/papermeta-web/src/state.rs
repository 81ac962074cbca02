//! Shared application state for the web server.

use std::sync::Arc;

use papermeta_ingestion::IngestionPipeline;
use papermeta_store::MetadataStore;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub store: Arc<MetadataStore>,
    pub pipeline: Arc<IngestionPipeline>,
}

impl AppState {
    pub fn new(pipeline: IngestionPipeline) -> Self {
        Self {
            store: Arc::new(MetadataStore::new()),
            pipeline: Arc::new(pipeline),
        }
    }
}

pub type SharedState = Arc<AppState>;
