//! papermeta web server
//!
//! Run with: cargo run -p papermeta-web

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use papermeta_common::PapermetaConfig;
use papermeta_ingestion::{
    ExtractionOptions, IngestionPipeline, LopdfExtractor, MetadataExtractor, UploadStorage,
};
use papermeta_web::{router::build_router, state::AppState};

const LOG_FILE: &str = "metadata_extraction.log";

/// Console plus log-file output. The returned guard flushes the file writer
/// on drop and must live for the whole process.
fn init_tracing(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = PapermetaConfig::load()?;
    let _guard = init_tracing(&config.storage.log_dir)?;

    info!(version = env!("CARGO_PKG_VERSION"), "papermeta starting up");
    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        upload_dir = %config.storage.upload_dir.display(),
        "Configuration loaded"
    );

    let backend = papermeta_llm::build_backend(&config.llm, config.api_key())?;
    let storage = UploadStorage::open(config.storage.upload_dir.clone()).await?;
    let metadata = MetadataExtractor::new(backend, ExtractionOptions::from_config(&config));
    let pipeline = IngestionPipeline::new(storage, Arc::new(LopdfExtractor), metadata);

    let app = build_router(AppState::new(pipeline), &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
