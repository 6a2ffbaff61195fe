//! PDF text-layer parsing and page rendering.

mod extractor;
mod pdfium;
mod text_layer;

pub use extractor::PdfExtractor;
pub use pdfium::PdfiumRenderer;
pub use text_layer::PdfExtractParser;

use image::DynamicImage;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A text-layer parser that returns one text fragment per page.
pub trait TextLayerParser: Send + Sync {
    /// Short engine name used in logs and fragment sources.
    fn name(&self) -> &'static str;

    /// Extract the embedded text of every page, in page order.
    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>>;
}

/// Turns leading pages of a document into images for OCR.
pub trait PageRenderer: Send + Sync {
    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Render up to `max_pages` pages at `dpi`.
    ///
    /// Pages that cannot be rendered are skipped; an error is returned only
    /// when the document itself cannot be read.
    fn render_pages(&self, data: &[u8], max_pages: u32, dpi: u32) -> Result<Vec<(u32, DynamicImage)>>;
}
