//! Document to field map: text acquisition followed by field extraction.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::acquire::{ExtractedText, TextAcquirer};
use crate::error::{AutofillError, Result};
use crate::extract::IdentityExtractor;
use crate::models::config::AutofillConfig;
use crate::models::fields::FieldMap;
use crate::models::report::ExtractionResponse;
use crate::qa::LazyAnswerer;

/// Result of running the pipeline on one document.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub text: ExtractedText,
    pub fields: FieldMap,
}

impl ExtractionOutput {
    pub fn response(&self) -> ExtractionResponse {
        ExtractionResponse::new(self.fields.clone(), self.text.len())
    }
}

/// Acquires text from a PDF and extracts identity fields from it.
pub struct DocumentPipeline {
    acquirer: TextAcquirer,
    extractor: IdentityExtractor,
}

impl DocumentPipeline {
    pub fn new(acquirer: TextAcquirer, extractor: IdentityExtractor) -> Self {
        Self { acquirer, extractor }
    }

    /// Build the pipeline described by `config`.
    ///
    /// OCR models are loaded eagerly and OCR is skipped when they are
    /// missing. The question-answering model loads on first use.
    pub fn from_config(config: &AutofillConfig) -> Self {
        let acquirer = TextAcquirer::new(config.pdf.clone(), config.ocr.clone());
        #[cfg(feature = "native")]
        let acquirer = Self::attach_ocr(acquirer, config);

        let mut extractor = IdentityExtractor::new(config.extraction.clone());
        if config.extraction.use_qa_fallback {
            extractor = extractor.with_answerer(Arc::new(Self::lazy_answerer(config)));
        }

        Self::new(acquirer, extractor)
    }

    #[cfg(feature = "native")]
    fn attach_ocr(acquirer: TextAcquirer, config: &AutofillConfig) -> TextAcquirer {
        if !config.ocr.enabled {
            return acquirer;
        }

        match crate::ocr::PureOcrEngine::from_dir(&config.models.model_dir, &config.models, config.ocr.clone()) {
            Ok(engine) => {
                if !crate::pdf::PdfiumRenderer::new(config.pdf.pdfium_dir.clone()).is_available() {
                    tracing::warn!("PDFium not found, OCR limited to images embedded in pages");
                }
                acquirer.with_recognizer(Box::new(engine))
            }
            Err(e) => {
                tracing::warn!("OCR unavailable, scanned pages will be skipped: {}", e);
                acquirer
            }
        }
    }

    #[cfg(feature = "native")]
    fn lazy_answerer(config: &AutofillConfig) -> LazyAnswerer {
        let config = config.clone();
        LazyAnswerer::new(move || {
            crate::qa::BertQa::from_config(&config)
                .map(|qa| Box::new(qa) as Box<dyn crate::qa::QuestionAnswerer>)
        })
    }

    #[cfg(not(feature = "native"))]
    fn lazy_answerer(_config: &AutofillConfig) -> LazyAnswerer {
        LazyAnswerer::unavailable()
    }

    /// Run acquisition and extraction on in-memory PDF bytes. Never fails;
    /// unreadable input yields an empty field map.
    pub fn extract_bytes(&self, data: &[u8]) -> ExtractionOutput {
        let text = self.acquirer.acquire(data);
        let fields = self.extractor.extract(&text.text);
        ExtractionOutput { text, fields }
    }

    /// Run the pipeline on a PDF file.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractionOutput> {
        if !path.exists() {
            return Err(AutofillError::DocumentNotFound(path.to_path_buf()));
        }

        info!("Extracting fields from {}", path.display());
        let data = std::fs::read(path)?;
        let output = self.extract_bytes(&data);

        if output.text.is_unreadable() {
            return Err(AutofillError::MalformedDocument(format!(
                "{} could not be parsed ({})",
                path.display(),
                output.text.failed_strategies.join(", ")
            )));
        }

        Ok(output)
    }
}
