//! LLM-backed metadata extraction.
//!
//! One chat request per document. The reply must be a single JSON object;
//! anything else becomes a failed record rather than an error.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use papermeta_common::PapermetaConfig;
use papermeta_llm::audit::complete_audited;
use papermeta_llm::{LlmBackend, LlmRequest, Message};

use crate::models::{
    ConfidenceMap, ExtractedMetadata, ExtractionOutcome, PaperMetadata, METADATA_FIELDS,
    RESERVED_KEYS,
};

/// Appended wherever text has been cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Fallback confidence for a field the provider filled in.
pub const DEFAULT_CONFIDENCE_PRESENT: f64 = 0.8;
/// Fallback confidence for a field the provider left empty.
pub const DEFAULT_CONFIDENCE_EMPTY: f64 = 0.0;

const SYSTEM_PROMPT: &str = "You are an expert on scientific papers. Extract bibliographic \
metadata strictly as JSON. If a field is missing from the paper, use null or an empty string. \
Do not add explanations, only the JSON object. For every field add a confidence score from 0 \
to 1 in the confidence object.";

const FIELD_INSTRUCTIONS: &str = "Please extract the following fields in JSON format:
- title (paper title)
- authors (list of authors as [{\"name\": \"Name\", \"affiliation\": \"Affiliation\"}])
- journal (journal name)
- conference (conference name)
- city (city of the conference or publication)
- publicationDate (publication date)
- abstract (abstract)
- funding (funding or grants)
- references (bibliography as an array of strings)
- keywords (keywords as an array of strings)
- doi (DOI of the paper)
- confidence (confidence score from 0 to 1 for each field)";

#[derive(Debug, Error)]
pub enum MetadataParseError {
    #[error("Provider response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Provider response is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Cut `text` to at most `max_chars` characters, appending the marker when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}

/// The excerpt kept alongside every record for human verification.
pub fn raw_text_sample(text: &str, sample_chars: usize) -> String {
    truncate_chars(text, sample_chars).into_owned()
}

/// Whether a provider value counts as filled in.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Confidence synthesised when the provider omitted its own scores.
pub fn default_confidence(fields: &serde_json::Map<String, Value>) -> ConfidenceMap {
    fields
        .iter()
        .filter(|(key, _)| METADATA_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| {
            let score = if is_present(value) {
                DEFAULT_CONFIDENCE_PRESENT
            } else {
                DEFAULT_CONFIDENCE_EMPTY
            };
            (key.clone(), score)
        })
        .collect()
}

/// Keep numeric scores for known fields, clamped into [0, 1].
pub fn normalize_confidence(value: &Value) -> ConfidenceMap {
    let Value::Object(scores) = value else {
        tracing::debug!("Ignoring non-object confidence value");
        return ConfidenceMap::new();
    };
    scores
        .iter()
        .filter(|(key, _)| METADATA_FIELDS.contains(&key.as_str()))
        .filter_map(|(key, v)| v.as_f64().map(|f| (key.clone(), f.clamp(0.0, 1.0))))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a provider completion into fields and a confidence map.
pub fn parse_completion(content: &str) -> Result<(PaperMetadata, ConfidenceMap), MetadataParseError> {
    let value: Value = serde_json::from_str(content.trim())?;
    let kind = json_kind(&value);
    let Value::Object(object) = value else {
        return Err(MetadataParseError::NotAnObject(kind));
    };

    let mut confidence_raw = None;
    let mut fields = serde_json::Map::new();
    for (key, value) in object {
        if key == "confidence" {
            confidence_raw = Some(value);
        } else if !RESERVED_KEYS.contains(&key.as_str()) {
            fields.insert(key, value);
        }
    }

    let confidence = match &confidence_raw {
        Some(raw) => normalize_confidence(raw),
        None => default_confidence(&fields),
    };
    let metadata: PaperMetadata = serde_json::from_value(Value::Object(fields))?;
    Ok((metadata, confidence))
}

/// Tunables for one extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub max_input_chars: usize,
    pub sample_chars: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub json_mode: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            max_input_chars: 40_000,
            sample_chars: 500,
            max_tokens: None,
            temperature: None,
            json_mode: true,
        }
    }
}

impl ExtractionOptions {
    pub fn from_config(config: &PapermetaConfig) -> Self {
        Self {
            max_input_chars: config.extraction.max_input_chars,
            sample_chars: config.extraction.sample_chars,
            max_tokens: Some(config.llm.max_tokens),
            temperature: Some(config.llm.temperature),
            json_mode: config.llm.json_mode,
        }
    }
}

pub struct MetadataExtractor {
    backend: Option<Arc<dyn LlmBackend>>,
    options: ExtractionOptions,
}

impl MetadataExtractor {
    pub fn new(backend: Option<Arc<dyn LlmBackend>>, options: ExtractionOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    fn build_request(&self, text: &str) -> LlmRequest {
        let user = format!("Here is the text of the paper:\n\n{text}\n\n{FIELD_INSTRUCTIONS}");
        LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
            model: None,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            json_mode: self.options.json_mode,
        }
    }

    /// Extract metadata for `document_id` from its full text.
    ///
    /// Never fails: provider and parse errors come back as
    /// [`ExtractionOutcome::Failed`] carrying the raw text sample.
    pub async fn extract(&self, document_id: &str, text: &str) -> ExtractionOutcome {
        let input = truncate_chars(text, self.options.max_input_chars);
        if let Cow::Owned(_) = input {
            tracing::info!(
                id = document_id,
                chars = text.chars().count(),
                limit = self.options.max_input_chars,
                "Text too long, truncating before extraction"
            );
        }
        let sample = raw_text_sample(&input, self.options.sample_chars);

        let Some(backend) = &self.backend else {
            tracing::error!(id = document_id, "LLM provider is not configured");
            return ExtractionOutcome::failed(
                "LLM provider is not configured; set the API key and restart the service",
                sample,
            );
        };

        tracing::info!(id = document_id, model = backend.model_id(), "Requesting metadata extraction");
        let resp = match complete_audited(backend.as_ref(), self.build_request(&input), Some(document_id)).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(id = document_id, error = %e, "Metadata extraction call failed");
                return ExtractionOutcome::failed(e.to_string(), sample);
            }
        };

        match parse_completion(&resp.content) {
            Ok((metadata, extraction_confidence)) => {
                tracing::info!(
                    id = document_id,
                    fields = extraction_confidence.len(),
                    authors = metadata.authors.len(),
                    references = metadata.references.len(),
                    "Metadata extracted"
                );
                ExtractionOutcome::Extracted(ExtractedMetadata {
                    metadata,
                    raw_text_sample: sample,
                    extraction_confidence,
                })
            }
            Err(e) => {
                tracing::error!(id = document_id, error = %e, "Could not parse provider response");
                ExtractionOutcome::failed(e.to_string(), sample)
            }
        }
    }
}
