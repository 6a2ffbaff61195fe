//! Raw text acquisition from PDF bytes with ordered fallback strategies.
//!
//! Text-layer parsers run first, in order, each contributing every page
//! fragment that is long enough. When they yield too little text, the
//! leading pages are rendered and passed through OCR. A failing strategy is
//! logged and skipped; acquisition itself never fails.

use std::fmt;

use tracing::{debug, info, warn};

use crate::models::config::{OcrConfig, PdfConfig};
use crate::ocr::PageRecognizer;
use crate::pdf::{PageRenderer, PdfExtractParser, PdfExtractor, PdfiumRenderer, TextLayerParser};

/// Strategy that produced a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// An embedded text layer, read by the named engine.
    TextLayer(&'static str),
    /// Optical character recognition of a rendered page.
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::TextLayer(engine) => write!(f, "text layer ({})", engine),
            TextSource::Ocr => f.write_str("OCR"),
        }
    }
}

/// One accepted piece of page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub source: TextSource,
    /// 1-indexed page number.
    pub page: u32,
    /// Page text as the strategy produced it.
    pub text: String,
}

/// Output of [`TextAcquirer::acquire`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Accepted fragments joined with a blank line.
    pub text: String,

    /// Accepted fragments in acquisition order.
    pub fragments: Vec<TextFragment>,

    /// Names of strategies that raised an error.
    pub failed_strategies: Vec<String>,

    /// Whether at least one text-layer parser could read the document.
    pub text_layer_readable: bool,
}

impl ExtractedText {
    fn from_fragments(
        fragments: Vec<TextFragment>,
        failed_strategies: Vec<String>,
        text_layer_readable: bool,
    ) -> Self {
        let text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            text,
            fragments,
            failed_strategies,
            text_layer_readable,
        }
    }

    /// Character count of the joined text.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// No parser could open the bytes and OCR produced nothing.
    pub fn is_unreadable(&self) -> bool {
        !self.text_layer_readable && !self.fragments.iter().any(|f| f.source == TextSource::Ocr)
    }
}

/// Runs the text acquisition strategies over a document.
pub struct TextAcquirer {
    parsers: Vec<Box<dyn TextLayerParser>>,
    renderers: Vec<Box<dyn PageRenderer>>,
    recognizer: Option<Box<dyn PageRecognizer>>,
    pdf: PdfConfig,
    ocr: OcrConfig,
}

impl TextAcquirer {
    /// Acquirer with the lopdf and pdf-extract text layers, PDFium page
    /// rendering and embedded-image extraction as the fallback renderer.
    /// OCR stays disabled until a recognizer is attached.
    pub fn new(pdf: PdfConfig, ocr: OcrConfig) -> Self {
        Self {
            parsers: vec![Box::new(PdfExtractor::new()), Box::new(PdfExtractParser::new())],
            renderers: vec![
                Box::new(PdfiumRenderer::new(pdf.pdfium_dir.clone())),
                Box::new(PdfExtractor::new()),
            ],
            recognizer: None,
            pdf,
            ocr,
        }
    }

    /// Replace the text-layer parsers.
    pub fn with_parsers(mut self, parsers: Vec<Box<dyn TextLayerParser>>) -> Self {
        self.parsers = parsers;
        self
    }

    /// Use a single renderer, or none to disable OCR.
    pub fn with_renderer(mut self, renderer: Option<Box<dyn PageRenderer>>) -> Self {
        self.renderers = renderer.into_iter().collect();
        self
    }

    /// Replace the renderers. They are tried in order until one yields a page.
    pub fn with_renderers(mut self, renderers: Vec<Box<dyn PageRenderer>>) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn PageRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Whether the OCR strategy can run.
    pub fn has_ocr(&self) -> bool {
        self.ocr.enabled && !self.renderers.is_empty() && self.recognizer.is_some()
    }

    /// Acquire text from PDF bytes.
    pub fn acquire(&self, data: &[u8]) -> ExtractedText {
        let mut fragments = Vec::new();
        let mut failed = Vec::new();
        let mut readable = false;

        for parser in &self.parsers {
            match parser.page_texts(data) {
                Ok(pages) => {
                    readable = true;
                    let before = fragments.len();
                    self.accept_pages(&mut fragments, TextSource::TextLayer(parser.name()), pages);
                    debug!(
                        "{} contributed {} fragments",
                        parser.name(),
                        fragments.len() - before
                    );
                }
                Err(e) => {
                    warn!("Text layer parser {} failed: {}", parser.name(), e);
                    failed.push(parser.name().to_string());
                }
            }
        }

        let layer_chars: usize = fragments.iter().map(|f| f.text.chars().count()).sum();
        if fragments.is_empty() || layer_chars < self.pdf.ocr_trigger_length {
            info!(
                "Text layers yielded {} characters, trying OCR",
                layer_chars
            );
            if let Err(name) = self.run_ocr(data, &mut fragments) {
                failed.push(name.to_string());
            }
        }

        let extracted = ExtractedText::from_fragments(fragments, failed, readable);
        info!(
            "Acquired {} characters from {} fragments",
            extracted.len(),
            extracted.fragments.len()
        );
        extracted
    }

    fn run_ocr(&self, data: &[u8], fragments: &mut Vec<TextFragment>) -> Result<(), &'static str> {
        let Some(recognizer) = &self.recognizer else {
            debug!("OCR unavailable, skipping");
            return Ok(());
        };
        if !self.ocr.enabled || self.renderers.is_empty() {
            debug!("OCR disabled by configuration");
            return Ok(());
        }

        let pages = self.render(data).ok_or("render")?;

        let mut any_failed = false;
        for (page, image) in pages {
            match recognizer.recognize(&image, &self.ocr.language) {
                Ok(text) => self.accept(fragments, TextSource::Ocr, page, &text),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", page, e);
                    any_failed = true;
                }
            }
        }

        if any_failed { Err("ocr") } else { Ok(()) }
    }

    /// Pages from the first renderer that produces any. `None` when every
    /// renderer failed.
    fn render(&self, data: &[u8]) -> Option<Vec<(u32, image::DynamicImage)>> {
        let mut rendered_nothing = false;
        for renderer in &self.renderers {
            match renderer.render_pages(data, self.pdf.ocr_max_pages, self.pdf.render_dpi) {
                Ok(pages) if !pages.is_empty() => {
                    debug!("{} rendered {} pages", renderer.name(), pages.len());
                    return Some(pages);
                }
                Ok(_) => {
                    debug!("{} rendered no pages", renderer.name());
                    rendered_nothing = true;
                }
                Err(e) => warn!("Page rendering with {} failed: {}", renderer.name(), e),
            }
        }

        rendered_nothing.then(Vec::new)
    }

    fn accept_pages(&self, fragments: &mut Vec<TextFragment>, source: TextSource, pages: Vec<String>) {
        for (i, text) in pages.iter().enumerate() {
            self.accept(fragments, source, i as u32 + 1, text);
        }
    }

    fn accept(&self, fragments: &mut Vec<TextFragment>, source: TextSource, page: u32, text: &str) {
        if text.trim().chars().count() > self.pdf.min_fragment_length {
            fragments.push(TextFragment {
                source,
                page,
                text: text.to_string(),
            });
        } else {
            debug!("Discarded short fragment from {} page {}", source, page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use image::DynamicImage;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedParser {
        name: &'static str,
        pages: Option<Vec<&'static str>>,
    }

    impl TextLayerParser for FixedParser {
        fn name(&self) -> &'static str {
            self.name
        }

        fn page_texts(&self, _data: &[u8]) -> crate::pdf::Result<Vec<String>> {
            match &self.pages {
                Some(pages) => Ok(pages.iter().map(|p| p.to_string()).collect()),
                None => Err(PdfError::Parse("broken".to_string())),
            }
        }
    }

    struct BlankRenderer;

    impl PageRenderer for BlankRenderer {
        fn name(&self) -> &'static str {
            "blank"
        }

        fn render_pages(&self, _data: &[u8], max_pages: u32, _dpi: u32) -> crate::pdf::Result<Vec<(u32, DynamicImage)>> {
            Ok((1..=max_pages).map(|p| (p, DynamicImage::new_rgb8(4, 4))).collect())
        }
    }

    struct CountingRecognizer {
        calls: Arc<AtomicUsize>,
        text: &'static str,
    }

    impl PageRecognizer for CountingRecognizer {
        fn recognize(&self, _image: &DynamicImage, language: &str) -> Result<String, OcrError> {
            assert_eq!(language, "eng");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    const LONG_PAGE: &str = "John Michael Smith\nGovernment of India\nDOB: 01/02/1990\nEmail: john@x.com";

    fn parser(name: &'static str, pages: Option<Vec<&'static str>>) -> Box<dyn TextLayerParser> {
        Box::new(FixedParser { name, pages })
    }

    #[test]
    fn test_short_fragments_are_discarded() {
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", Some(vec!["too short", LONG_PAGE]))])
            .with_renderer(None);

        let extracted = acquirer.acquire(b"");
        assert_eq!(extracted.fragments.len(), 1);
        assert_eq!(extracted.fragments[0].page, 2);
        assert_eq!(extracted.text, LONG_PAGE);
    }

    #[test]
    fn test_fragments_join_with_blank_line_and_keep_duplicates() {
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", Some(vec![LONG_PAGE])), parser("b", Some(vec![LONG_PAGE]))])
            .with_renderer(None);

        let extracted = acquirer.acquire(b"");
        assert_eq!(extracted.text, format!("{}\n\n{}", LONG_PAGE, LONG_PAGE));
        assert_eq!(extracted.fragments[1].source, TextSource::TextLayer("b"));
    }

    #[test]
    fn test_failing_parsers_yield_empty_text() {
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", None), parser("b", None)])
            .with_renderer(None);

        let extracted = acquirer.acquire(b"junk");
        assert!(extracted.is_empty());
        assert!(extracted.is_unreadable());
        assert_eq!(extracted.failed_strategies, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_ocr_runs_when_text_layer_is_thin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", Some(vec![LONG_PAGE]))])
            .with_renderer(Some(Box::new(BlankRenderer)))
            .with_recognizer(Box::new(CountingRecognizer {
                calls: calls.clone(),
                text: "Recognized page text that is comfortably longer than fifty characters.",
            }));

        let extracted = acquirer.acquire(b"");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(extracted.fragments.len(), 4);
        assert!(!extracted.is_unreadable());
    }

    #[test]
    fn test_ocr_skipped_when_text_layer_is_rich() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rich: &'static str = Box::leak(LONG_PAGE.repeat(4).into_boxed_str());
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", Some(vec![rich]))])
            .with_renderer(Some(Box::new(BlankRenderer)))
            .with_recognizer(Box::new(CountingRecognizer {
                calls: calls.clone(),
                text: "",
            }));

        acquirer.acquire(b"");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    struct BrokenRenderer;

    impl PageRenderer for BrokenRenderer {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn render_pages(&self, _data: &[u8], _max_pages: u32, _dpi: u32) -> crate::pdf::Result<Vec<(u32, DynamicImage)>> {
            Err(PdfError::Render("library missing".to_string()))
        }
    }

    fn ocr_acquirer(renderers: Vec<Box<dyn PageRenderer>>, calls: Arc<AtomicUsize>) -> TextAcquirer {
        TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(Vec::new())
            .with_renderers(renderers)
            .with_recognizer(Box::new(CountingRecognizer {
                calls,
                text: "Recognized page text that is comfortably longer than fifty characters.",
            }))
    }

    #[test]
    fn test_failing_renderer_falls_back_to_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let acquirer = ocr_acquirer(vec![Box::new(BrokenRenderer), Box::new(BlankRenderer)], calls.clone());

        let extracted = acquirer.acquire(b"");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(extracted.failed_strategies.is_empty());
        assert!(extracted.fragments.iter().all(|f| f.source == TextSource::Ocr));
    }

    #[test]
    fn test_all_renderers_failing_is_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let acquirer = ocr_acquirer(vec![Box::new(BrokenRenderer)], calls.clone());

        let extracted = acquirer.acquire(b"");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(extracted.failed_strategies, vec!["render".to_string()]);
    }

    #[test]
    fn test_page_text_kept_and_measured_untrimmed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let padded: &'static str = Box::leak(format!("{}{}", LONG_PAGE.repeat(2), " ".repeat(60)).into_boxed_str());
        assert!(padded.trim().chars().count() < 200);
        assert!(padded.chars().count() >= 200);

        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default())
            .with_parsers(vec![parser("a", Some(vec![padded]))])
            .with_renderer(Some(Box::new(BlankRenderer)))
            .with_recognizer(Box::new(CountingRecognizer {
                calls: calls.clone(),
                text: "",
            }));

        let extracted = acquirer.acquire(b"");
        assert_eq!(extracted.text, padded);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_has_ocr_requires_recognizer() {
        let acquirer = TextAcquirer::new(PdfConfig::default(), OcrConfig::default());
        assert!(!acquirer.has_ocr());
    }
}
