//! Export rendering: JSON, XML and a fixed plain-text layout.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};

use papermeta_common::{PapermetaError, Result};
use papermeta_ingestion::{MetadataRecord, PaperMetadata};

/// Record keys that stay internal to the service.
const INTERNAL_KEYS: &[&str] = &["raw_text_sample", "extraction_confidence"];

const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Xml,
    Txt,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Xml  => "application/xml",
            ExportFormat::Txt  => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PapermetaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xml"  => Ok(ExportFormat::Xml),
            "txt"  => Ok(ExportFormat::Txt),
            _ => Err(PapermetaError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub content_type: &'static str,
    pub body: String,
}

pub fn render_export(record: &MetadataRecord, format: ExportFormat) -> Result<RenderedExport> {
    let body = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&export_value(record)?)?,
        ExportFormat::Xml  => render_xml(&export_value(record)?)?,
        ExportFormat::Txt  => render_txt(record)?,
    };
    tracing::debug!(id = record.id(), ?format, bytes = body.len(), "Record exported");
    Ok(RenderedExport { content_type: format.content_type(), body })
}

/// The record as exported: every key except the internal ones, in order.
pub fn export_value(record: &MetadataRecord) -> Result<Value> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(Value::Object(
            fields
                .into_iter()
                .filter(|(k, _)| !INTERNAL_KEYS.contains(&k.as_str()))
                .collect::<Map<String, Value>>(),
        )),
        other => Err(PapermetaError::Export(format!(
            "record {} did not serialize to an object: {other}",
            record.id()
        ))),
    }
}

// ── XML ───────────────────────────────────────────────────────────────────────

fn render_xml(value: &Value) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, "metadata", value)?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| PapermetaError::Export(e.to_string()))?;
    xml.push('\n');
    Ok(xml)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| PapermetaError::Export(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> Result<()> {
    let name = xml_chars(key);
    let (tag, start) = if is_xml_name(key) {
        (key, BytesStart::new(key))
    } else {
        ("key", BytesStart::new("key").with_attributes([("name", name.as_ref())]))
    };

    match value {
        Value::Null => emit(writer, Event::Empty(start)),
        Value::Object(map) if map.is_empty() => emit(writer, Event::Empty(start)),
        Value::Array(items) if items.is_empty() => emit(writer, Event::Empty(start)),
        Value::String(s) if s.is_empty() => emit(writer, Event::Empty(start)),
        Value::Object(map) => {
            emit(writer, Event::Start(start))?;
            for (k, v) in map {
                write_element(writer, k, v)?;
            }
            emit(writer, Event::End(BytesEnd::new(tag)))
        }
        Value::Array(items) => {
            emit(writer, Event::Start(start))?;
            for item in items {
                write_element(writer, "item", item)?;
            }
            emit(writer, Event::End(BytesEnd::new(tag)))
        }
        Value::String(s) => write_text(writer, start, tag, s),
        other => write_text(writer, start, tag, &other.to_string()),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, start: BytesStart<'_>, tag: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(&xml_chars(text))))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

/// Drop characters outside the XML 1.0 `Char` production. PDF text often
/// carries C0 controls (form feeds, ligature artifacts).
fn xml_chars(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
    }
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

/// Conservative XML 1.0 name check; names reserved by the `xml` prefix are
/// treated as invalid.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if name.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("xml")) {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

// ── Plain text ────────────────────────────────────────────────────────────────

fn present(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn render_txt(record: &MetadataRecord) -> Result<String> {
    let empty = PaperMetadata::default();
    let mut out = String::new();
    write_txt(&mut out, record.metadata().unwrap_or(&empty))
        .map_err(|e| PapermetaError::Export(format!("text export of {} failed: {e}", record.id())))?;
    Ok(out)
}

fn write_txt(out: &mut String, m: &PaperMetadata) -> fmt::Result {
    writeln!(out, "Title: {}\n", present(&m.title))?;

    writeln!(out, "Authors:")?;
    if m.authors.is_empty() {
        writeln!(out, "{PLACEHOLDER}")?;
    }
    for author in &m.authors {
        let name = if author.name.trim().is_empty() { PLACEHOLDER } else { &author.name };
        write!(out, "- {name}")?;
        if let Some(aff) = author.affiliation() {
            write!(out, " ({aff})")?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;

    writeln!(out, "Journal: {}", present(&m.journal))?;
    writeln!(out, "Conference: {}", present(&m.conference))?;
    writeln!(out, "City: {}", present(&m.city))?;
    writeln!(out, "Publication date: {}", present(&m.publication_date))?;
    writeln!(out, "DOI: {}\n", present(&m.doi))?;

    writeln!(out, "Abstract:\n{}\n", present(&m.abstract_text))?;
    writeln!(out, "Funding:\n{}\n", present(&m.funding))?;

    writeln!(out, "References:")?;
    if m.references.is_empty() {
        writeln!(out, "{PLACEHOLDER}")?;
    }
    for (i, reference) in m.references.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, reference)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use papermeta_ingestion::models::{ConfidenceMap, ExtractedMetadata};
    use papermeta_ingestion::{Author, ExtractionOutcome};

    fn full_record() -> MetadataRecord {
        MetadataRecord::new(
            "doc-1",
            ExtractionOutcome::Extracted(ExtractedMetadata {
                metadata: PaperMetadata {
                    title: Some("Deep Learning".into()),
                    authors: vec![
                        Author { name: "Y. LeCun".into(), affiliation: Some("NYU".into()) },
                        Author { name: "G. Hinton".into(), affiliation: Some("University of Toronto".into()) },
                    ],
                    journal: Some("Nature".into()),
                    conference: Some("NIPS Deep Learning Workshop".into()),
                    city: Some("London".into()),
                    publication_date: Some("2015-05-28".into()),
                    abstract_text: Some("Deep learning allows models...".into()),
                    funding: Some("CIFAR".into()),
                    references: vec!["Rumelhart 1986".into(), "Hochreiter 1997".into()],
                    keywords: vec!["neural networks".into()],
                    doi: Some("10.1038/nature14539".into()),
                    extra: Default::default(),
                },
                raw_text_sample: "Deep Learning\nYann LeCun".into(),
                extraction_confidence: ConfidenceMap::from([("title".to_string(), 0.95)]),
            }),
        )
    }

    fn empty_record() -> MetadataRecord {
        MetadataRecord::new(
            "doc-2",
            ExtractionOutcome::Extracted(ExtractedMetadata {
                metadata: PaperMetadata::default(),
                raw_text_sample: String::new(),
                extraction_confidence: ConfidenceMap::new(),
            }),
        )
    }

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("Xml".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!(matches!("csv".parse::<ExportFormat>(), Err(PapermetaError::UnsupportedFormat(_))));
        assert!(matches!("".parse::<ExportFormat>(), Err(PapermetaError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_json_export_strips_internal_fields() {
        let out = render_export(&full_record(), ExportFormat::Json).unwrap();
        assert_eq!(out.content_type, "application/json");

        let v: Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(v["id"], "doc-1");
        assert_eq!(v["title"], "Deep Learning");
        assert_eq!(v["authors"][0]["affiliation"], "NYU");
        assert!(v.get("raw_text_sample").is_none());
        assert!(v.get("extraction_confidence").is_none());
    }

    #[test]
    fn test_json_export_of_failed_record() {
        let record = MetadataRecord::new("x", ExtractionOutcome::failed("provider down", "sample"));
        let v = export_value(&record).unwrap();
        assert_eq!(v, serde_json::json!({ "id": "x", "error": "provider down" }));
    }

    #[test]
    fn test_xml_export_layout() {
        let out = render_export(&full_record(), ExportFormat::Xml).unwrap();
        assert_eq!(out.content_type, "application/xml");
        let xml = out.body;

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("\n<metadata>\n  <id>doc-1</id>"));
        assert!(xml.contains("\n  <title>Deep Learning</title>"));
        assert!(xml.contains("\n  <authors>\n    <item>\n      <name>Y. LeCun</name>"));
        assert!(xml.contains("\n  <conference>NIPS Deep Learning Workshop</conference>"));
        assert!(xml.contains("\n  <keywords>\n    <item>neural networks</item>\n  </keywords>"));
        assert!(xml.contains("<item>Rumelhart 1986</item>"));
        assert!(xml.trim_end().ends_with("</metadata>"));
        assert!(!xml.contains("raw_text_sample"));
        assert!(!xml.contains("extraction_confidence"));
    }

    #[test]
    fn test_xml_escapes_text_and_invalid_names() {
        let value = serde_json::json!({
            "title": "Cats & <Dogs>",
            "2nd author": "someone",
            "count": 3
        });
        let xml = render_xml(&value).unwrap();
        assert!(xml.contains("<title>Cats &amp; &lt;Dogs&gt;</title>"));
        assert!(xml.contains("<key name=\"2nd author\">someone</key>"));
        assert!(xml.contains("<count>3</count>"));
    }

    #[test]
    fn test_xml_empty_values_are_empty_elements() {
        let xml = render_xml(&serde_json::json!({
            "journal": null,
            "keywords": [],
            "funding": ""
        }))
        .unwrap();
        assert!(xml.contains("\n  <journal/>"));
        assert!(xml.contains("\n  <keywords/>"));
        assert!(xml.contains("\n  <funding/>"));
    }

    #[test]
    fn test_xml_drops_control_characters() {
        let xml = render_xml(&serde_json::json!({
            "abstract": "fi\u{0002}nancial \u{000C}page\tend",
            "bad\u{0001}key": "x"
        }))
        .unwrap();
        assert!(xml.contains("<abstract>financial page\tend</abstract>"));
        assert!(xml.contains("<key name=\"badkey\">x</key>"));
        assert!(!xml.chars().any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
    }

    #[test]
    fn test_xml_chars_borrows_clean_text() {
        assert!(matches!(xml_chars("plain text\n"), Cow::Borrowed(_)));
        assert_eq!(xml_chars("a\u{0}b\u{FFFE}c"), "abc");
        assert_eq!(xml_chars("emoji \u{1F600} ok"), "emoji \u{1F600} ok");
    }

    #[test]
    fn test_xml_name_check() {
        assert!(is_xml_name("publicationDate"));
        assert!(is_xml_name("_private"));
        assert!(is_xml_name("a-b.c"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("1st"));
        assert!(!is_xml_name("has space"));
        assert!(!is_xml_name("xmlns"));
    }

    #[test]
    fn test_txt_export_full_record() {
        let out = render_export(&full_record(), ExportFormat::Txt).unwrap();
        assert_eq!(out.content_type, "text/plain; charset=utf-8");
        assert_eq!(
            out.body,
            "Title: Deep Learning\n\
             \n\
             Authors:\n\
             - Y. LeCun (NYU)\n\
             - G. Hinton (University of Toronto)\n\
             \n\
             Journal: Nature\n\
             Conference: NIPS Deep Learning Workshop\n\
             City: London\n\
             Publication date: 2015-05-28\n\
             DOI: 10.1038/nature14539\n\
             \n\
             Abstract:\n\
             Deep learning allows models...\n\
             \n\
             Funding:\n\
             CIFAR\n\
             \n\
             References:\n\
             1. Rumelhart 1986\n\
             2. Hochreiter 1997\n"
        );
    }

    #[test]
    fn test_txt_export_all_missing() {
        let body = render_txt(&empty_record()).unwrap();
        assert_eq!(
            body,
            "Title: N/A\n\nAuthors:\nN/A\n\nJournal: N/A\nConference: N/A\nCity: N/A\n\
             Publication date: N/A\nDOI: N/A\n\nAbstract:\nN/A\n\nFunding:\nN/A\n\n\
             References:\nN/A\n"
        );
        // A failed record renders the same placeholders.
        let failed = MetadataRecord::new("f", ExtractionOutcome::failed("boom", ""));
        assert_eq!(render_txt(&failed).unwrap(), body);
    }
}
