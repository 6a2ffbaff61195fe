//! Text-layer parsing with pdf-extract.

use tracing::debug;

use super::{Result, TextLayerParser};
use crate::error::PdfError;

/// Second text-layer engine, independent of lopdf's own text extraction.
///
/// pdf-extract lays out glyphs by position and often recovers text that
/// lopdf misses in documents with unusual font encodings.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractParser;

impl PdfExtractParser {
    pub fn new() -> Self {
        Self
    }
}

impl TextLayerParser for PdfExtractParser {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data))
            .map_err(|_| PdfError::TextExtraction("pdf-extract panicked".to_string()))?
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        debug!("pdf-extract returned {} pages", pages.len());
        Ok(pages)
    }
}
