//! papermeta-ingestion — Upload-to-record pipeline.
//! - Upload validation and storage
//! - PDF text extraction
//! - LLM metadata extraction (prompting, truncation, response parsing,
//!   confidence normalisation)

pub mod metadata;
pub mod models;
pub mod pdf_text;
pub mod pipeline;
pub mod storage;

pub use metadata::{ExtractionOptions, MetadataExtractor};
pub use models::{Author, ExtractionOutcome, MetadataRecord, PaperMetadata};
pub use pdf_text::{LopdfExtractor, TextExtractor};
pub use pipeline::IngestionPipeline;
pub use storage::UploadStorage;
