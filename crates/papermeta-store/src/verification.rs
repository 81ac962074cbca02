//! Side-by-side view for checking extracted fields against the source text.

use serde::Serialize;

use papermeta_ingestion::models::ConfidenceMap;
use papermeta_ingestion::{Author, MetadataRecord, PaperMetadata};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationView {
    pub raw_text_sample: String,
    pub extraction_confidence: ConfidenceMap,
    pub metadata: VerifiedFields,
}

/// The subset of fields a reviewer checks by eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerifiedFields {
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub journal: Option<String>,
    #[serde(rename = "publicationDate")]
    pub publication_date: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    pub keywords: Vec<String>,
}

impl From<&PaperMetadata> for VerifiedFields {
    fn from(m: &PaperMetadata) -> Self {
        Self {
            title: m.title.clone(),
            authors: m.authors.clone(),
            journal: m.journal.clone(),
            publication_date: m.publication_date.clone(),
            abstract_text: m.abstract_text.clone(),
            doi: m.doi.clone(),
            keywords: m.keywords.clone(),
        }
    }
}

impl VerificationView {
    pub fn from_record(record: &MetadataRecord) -> Self {
        Self {
            raw_text_sample: record.raw_text_sample().to_string(),
            extraction_confidence: record.confidence(),
            metadata: record.metadata().map(VerifiedFields::from).unwrap_or_default(),
        }
    }
}
