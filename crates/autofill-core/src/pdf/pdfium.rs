//! Page rasterization through PDFium.

use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, Rgba};
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::{PageRenderer, Result};
use crate::error::PdfError;

/// Renders whole pages, vector content included, with the PDFium library.
///
/// The library is bound per call: first from `library_dir` when set, then
/// from the system search path.
#[derive(Debug, Default, Clone)]
pub struct PdfiumRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    /// Whether the PDFium library can be loaded.
    pub fn is_available(&self) -> bool {
        self.bind().is_ok()
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&*dir.to_string_lossy()))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfError::Render(format!("PDFium library unavailable: {}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn render_pages(&self, data: &[u8], max_pages: u32, dpi: u32) -> Result<Vec<(u32, DynamicImage)>> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut rendered = Vec::new();
        for (index, page) in document.pages().iter().take(max_pages as usize).enumerate() {
            let number = index as u32 + 1;
            let target_width = (page.width().value * dpi as f32 / 72.0).round().max(1.0) as i32;

            let config = PdfRenderConfig::new()
                .set_target_width(target_width)
                .render_form_data(true);

            match page.render_with_config(&config) {
                Ok(bitmap) => {
                    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
                    match ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, bitmap.as_rgba_bytes()) {
                        Some(buffer) => {
                            debug!("Rendered page {} at {} DPI: {}x{}", number, dpi, width, height);
                            rendered.push((number, DynamicImage::ImageRgba8(buffer)));
                        }
                        None => warn!("Page {} bitmap has an unexpected size", number),
                    }
                }
                Err(e) => warn!("Could not render page {}: {}", number, e),
            }
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::extractor::single_page_pdf;

    #[test]
    fn test_missing_library_is_a_render_error() {
        let renderer = PdfiumRenderer::new(Some(PathBuf::from("/nonexistent/pdfium")));
        if renderer.is_available() {
            return;
        }
        let result = renderer.render_pages(&single_page_pdf(|_| None), 3, 300);
        assert!(matches!(result, Err(PdfError::Render(_))));
    }

    #[test]
    fn test_vector_page_is_rasterized() {
        let renderer = PdfiumRenderer::default();
        if !renderer.is_available() {
            eprintln!("PDFium not installed, skipping rasterization check");
            return;
        }

        let pages = renderer.render_pages(&single_page_pdf(|_| None), 3, 300).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, 1);
        assert_eq!(pages[0].1.width(), 2550);
    }
}
