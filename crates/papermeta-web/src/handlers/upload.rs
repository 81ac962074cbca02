use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use papermeta_common::ApiError;

use crate::state::SharedState;
use crate::upload::parse_upload;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub id: String,
}

/// Accept a PDF, run extraction and store the record.
///
/// Provider failures still answer 200; the stored record carries the error.
pub async fn upload_pdf(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = parse_upload(multipart).await?;
    let record = state.pipeline.ingest(&file.filename, &file.data).await?;

    if let Some(error) = record.error() {
        tracing::warn!(id = record.id(), filename = %file.filename, error, "Stored record without metadata");
    }
    let record = state.store.insert(record)?;

    Ok(Json(UploadResponse {
        filename: file.filename,
        id: record.id().to_string(),
    }))
}
