//! Summary statistics over one record.

use std::collections::BTreeSet;

use serde::Serialize;

use papermeta_ingestion::models::ConfidenceMap;
use papermeta_ingestion::MetadataRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsView {
    pub author_count: usize,
    pub reference_count: usize,
    pub publication_year: Option<String>,
    pub affiliations: Vec<String>,
    pub keyword_count: usize,
    pub extraction_confidence: ConfidenceSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceSummary {
    pub average: f64,
    pub by_field: ConfidenceMap,
}

impl ConfidenceSummary {
    pub fn new(by_field: ConfidenceMap) -> Self {
        let average = if by_field.is_empty() {
            0.0
        } else {
            by_field.values().sum::<f64>() / by_field.len() as f64
        };
        Self { average, by_field }
    }
}

/// Leading component of a date like `2021-03-15`; no validation is done.
fn publication_year(date: Option<&str>) -> Option<String> {
    let date = date.filter(|d| !d.is_empty())?;
    Some(date.split('-').next().unwrap_or(date).to_string())
}

impl StatisticsView {
    pub fn from_record(record: &MetadataRecord) -> Self {
        let confidence = ConfidenceSummary::new(record.confidence());
        let Some(m) = record.metadata() else {
            return Self {
                author_count: 0,
                reference_count: 0,
                publication_year: None,
                affiliations: Vec::new(),
                keyword_count: 0,
                extraction_confidence: confidence,
            };
        };

        let affiliations: BTreeSet<&str> = m.authors.iter().filter_map(|a| a.affiliation()).collect();

        Self {
            author_count: m.authors.len(),
            reference_count: m.references.len(),
            publication_year: publication_year(m.publication_date.as_deref()),
            affiliations: affiliations.into_iter().map(str::to_string).collect(),
            keyword_count: m.keywords.len(),
            extraction_confidence: confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papermeta_ingestion::models::ExtractedMetadata;
    use papermeta_ingestion::{Author, ExtractionOutcome, PaperMetadata};

    fn author(name: &str, affiliation: Option<&str>) -> Author {
        Author { name: name.into(), affiliation: affiliation.map(Into::into) }
    }

    #[test]
    fn test_statistics_for_populated_record() {
        let record = MetadataRecord::new(
            "a",
            ExtractionOutcome::Extracted(ExtractedMetadata {
                metadata: PaperMetadata {
                    authors: vec![
                        author("A", Some("MIT")),
                        author("B", Some("Stanford")),
                        author("C", Some("MIT")),
                        author("D", None),
                        author("E", Some("")),
                    ],
                    references: vec!["r1".into(), "r2".into(), "r3".into()],
                    keywords: vec!["k1".into(), "k2".into()],
                    publication_date: Some("2021-03-15".into()),
                    ..Default::default()
                },
                raw_text_sample: String::new(),
                extraction_confidence: ConfidenceMap::from([
                    ("title".to_string(), 0.9),
                    ("doi".to_string(), 0.5),
                ]),
            }),
        );
        let stats = StatisticsView::from_record(&record);

        assert_eq!(stats.author_count, 5);
        assert_eq!(stats.reference_count, 3);
        assert_eq!(stats.keyword_count, 2);
        assert_eq!(stats.publication_year.as_deref(), Some("2021"));
        assert_eq!(stats.affiliations, vec!["MIT", "Stanford"]);
        assert!((stats.extraction_confidence.average - 0.7).abs() < 1e-9);
        assert_eq!(stats.extraction_confidence.by_field.len(), 2);

        let v = serde_json::to_value(&stats).unwrap();
        assert_eq!(v["authorCount"], 5);
        assert_eq!(v["publicationYear"], "2021");
        assert_eq!(v["extractionConfidence"]["byField"]["doi"], 0.5);
    }

    #[test]
    fn test_empty_confidence_averages_to_zero() {
        assert_eq!(ConfidenceSummary::new(ConfidenceMap::new()).average, 0.0);
    }

    #[test]
    fn test_publication_year() {
        assert_eq!(publication_year(Some("2019")).as_deref(), Some("2019"));
        assert_eq!(publication_year(Some("2019-07")).as_deref(), Some("2019"));
        assert_eq!(publication_year(Some("")), None);
        assert_eq!(publication_year(None), None);
    }

    #[test]
    fn test_failed_record_statistics() {
        let record = MetadataRecord::new("f", ExtractionOutcome::failed("boom", "s"));
        let v = serde_json::to_value(StatisticsView::from_record(&record)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "authorCount": 0,
                "referenceCount": 0,
                "publicationYear": null,
                "affiliations": [],
                "keywordCount": 0,
                "extractionConfidence": { "average": 0.0, "byField": {} }
            })
        );
    }
}
