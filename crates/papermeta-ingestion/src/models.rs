//! Data models for extracted paper metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire names of the bibliographic fields requested from the provider.
pub const METADATA_FIELDS: &[&str] = &[
    "title",
    "authors",
    "journal",
    "conference",
    "city",
    "publicationDate",
    "abstract",
    "funding",
    "references",
    "keywords",
    "doi",
];

/// Keys owned by the record itself; never taken from provider output.
pub const RESERVED_KEYS: &[&str] = &["id", "error", "raw_text_sample", "extraction_confidence"];

/// Per-field confidence in [0, 1], keyed by wire field name.
pub type ConfidenceMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuthorRepr")]
pub struct Author {
    pub name: String,
    pub affiliation: Option<String>,
}

impl Author {
    /// The affiliation, if it carries any text.
    pub fn affiliation(&self) -> Option<&str> {
        self.affiliation.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// Providers return authors either as objects or as bare names.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorRepr {
    Name(String),
    Fields {
        #[serde(default, deserialize_with = "lenient::opt_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::opt_text")]
        affiliation: Option<String>,
    },
}

impl From<AuthorRepr> for Author {
    fn from(repr: AuthorRepr) -> Self {
        match repr {
            AuthorRepr::Name(name) => Author { name, affiliation: None },
            AuthorRepr::Fields { name, affiliation } => Author {
                name: name.unwrap_or_default(),
                affiliation,
            },
        }
    }
}

/// Bibliographic fields extracted from a paper.
///
/// Keys the provider returns beyond the fixed set are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::author_seq")]
    pub authors: Vec<Author>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub conference: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub city: Option<String>,
    #[serde(rename = "publicationDate", default, deserialize_with = "lenient::opt_text")]
    pub publication_date: Option<String>,
    #[serde(rename = "abstract", default, deserialize_with = "lenient::opt_text")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub funding: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_seq")]
    pub references: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text_seq")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub doi: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedMetadata {
    #[serde(flatten)]
    pub metadata: PaperMetadata,
    pub raw_text_sample: String,
    pub extraction_confidence: ConfidenceMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedExtraction {
    pub error: String,
    pub raw_text_sample: String,
}

/// Result of the metadata extraction step. Both variants are stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Extracted(ExtractedMetadata),
    Failed(FailedExtraction),
}

impl ExtractionOutcome {
    pub fn failed(error: impl Into<String>, raw_text_sample: impl Into<String>) -> Self {
        ExtractionOutcome::Failed(FailedExtraction {
            error: error.into(),
            raw_text_sample: raw_text_sample.into(),
        })
    }
}

/// One stored document. Serializes flat: `{id, ...fields}` on success,
/// `{id, error, raw_text_sample}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    id: String,
    #[serde(flatten)]
    outcome: ExtractionOutcome,
}

impl MetadataRecord {
    pub fn new(id: impl Into<String>, outcome: ExtractionOutcome) -> Self {
        Self { id: id.into(), outcome }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn outcome(&self) -> &ExtractionOutcome {
        &self.outcome
    }

    /// Extracted fields, or `None` for a failed extraction.
    pub fn metadata(&self) -> Option<&PaperMetadata> {
        match &self.outcome {
            ExtractionOutcome::Extracted(e) => Some(&e.metadata),
            ExtractionOutcome::Failed(_)    => None,
        }
    }

    pub fn raw_text_sample(&self) -> &str {
        match &self.outcome {
            ExtractionOutcome::Extracted(e) => &e.raw_text_sample,
            ExtractionOutcome::Failed(f)    => &f.raw_text_sample,
        }
    }

    /// Confidence map; empty for a failed extraction.
    pub fn confidence(&self) -> ConfidenceMap {
        match &self.outcome {
            ExtractionOutcome::Extracted(e) => e.extraction_confidence.clone(),
            ExtractionOutcome::Failed(_)    => ConfidenceMap::new(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ExtractionOutcome::Extracted(_) => None,
            ExtractionOutcome::Failed(f)    => Some(&f.error),
        }
    }
}

mod lenient {
    //! Best-effort decoders for provider output.

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Author;

    /// Text for a scalar position: null is absent, strings pass through,
    /// arrays of scalars are joined, anything else is its compact JSON.
    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let parts: Vec<String> = items.into_iter().filter_map(scalar_text).collect();
                if parts.is_empty() { None } else { Some(parts.join("; ")) }
            }
            other => Some(other.to_string()),
        }
    }

    fn item_text(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub fn text_seq<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().filter_map(item_text).collect(),
            other => item_text(other).into_iter().collect(),
        })
    }

    pub fn author_seq<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Author>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(|v| Author::deserialize(v).map_err(D::Error::custom))
                .collect(),
            other => Author::deserialize(other)
                .map(|a| vec![a])
                .map_err(D::Error::custom),
        }
    }
}
