//! Plain-text extraction from PDF files.

use anyhow::{Context, Result};
use std::path::Path;

/// Turns a stored PDF into plain text. Implementations are blocking.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, pdf_path: &Path) -> Result<String>;
}

/// lopdf-based extraction, page by page.
#[derive(Debug, Clone, Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let pdf = lopdf::Document::load(pdf_path)
            .with_context(|| format!("lopdf failed to open {}", pdf_path.display()))?;

        let page_numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();
        let mut text = String::new();

        for page in &page_numbers {
            // A single unreadable page should not sink the whole document
            match pdf.extract_text(&[*page]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => tracing::warn!(
                    path = %pdf_path.display(),
                    page,
                    error = %e,
                    "Skipping page without extractable text"
                ),
            }
        }

        tracing::info!(
            path = %pdf_path.display(),
            pages = page_numbers.len(),
            chars = text.chars().count(),
            "Extracted text from PDF"
        );
        Ok(text)
    }
}
