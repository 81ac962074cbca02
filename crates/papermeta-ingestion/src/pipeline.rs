//! Upload → text → metadata pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use papermeta_common::{PapermetaError, Result};

use crate::metadata::MetadataExtractor;
use crate::models::MetadataRecord;
use crate::pdf_text::TextExtractor;
use crate::storage::UploadStorage;

/// Reject anything whose name does not end in `.pdf`.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.ends_with(".pdf") {
        Ok(())
    } else {
        Err(PapermetaError::InvalidInput(format!(
            "only PDF files are supported, got {filename:?}"
        )))
    }
}

pub struct IngestionPipeline {
    storage: UploadStorage,
    text: Arc<dyn TextExtractor>,
    metadata: MetadataExtractor,
}

impl IngestionPipeline {
    pub fn new(storage: UploadStorage, text: Arc<dyn TextExtractor>, metadata: MetadataExtractor) -> Self {
        Self { storage, text, metadata }
    }

    pub fn storage(&self) -> &UploadStorage {
        &self.storage
    }

    /// Store the upload, extract its text and metadata, and build the record.
    ///
    /// Provider failures do not fail ingestion; they yield a record in the
    /// failed state. Bad names, write errors and empty text do fail it.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<MetadataRecord> {
        validate_filename(filename)?;

        let id = Uuid::new_v4().to_string();
        let path = self.storage.save(&id, bytes).await?;
        tracing::info!(id = %id, filename, bytes = bytes.len(), "File uploaded");

        let text = self.extract_text(&id, path).await?;
        let outcome = self.metadata.extract(&id, &text).await;

        Ok(MetadataRecord::new(id, outcome))
    }

    async fn extract_text(&self, id: &str, path: PathBuf) -> Result<String> {
        let extractor = Arc::clone(&self.text);
        let extracted = tokio::task::spawn_blocking(move || extractor.extract_text(&path))
            .await
            .map_err(|e| PapermetaError::Extraction(format!("extraction task aborted: {e}")))?;

        match extracted {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => {
                tracing::error!(id, "PDF yielded no text");
                Err(PapermetaError::Extraction("could not extract text from PDF".to_string()))
            }
            Err(e) => {
                tracing::error!(id, error = %e, "PDF text extraction failed");
                Err(PapermetaError::Extraction(format!("could not extract text from PDF: {e:#}")))
            }
        }
    }
}
