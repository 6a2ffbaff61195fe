//! Error types for the autofill-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the autofill library.
#[derive(Error, Debug)]
pub enum AutofillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Question-answering error.
    #[error("question answering error: {0}")]
    Qa(#[from] QaError),

    /// Form filling error.
    #[error("form filling error: {0}")]
    Fill(#[from] FillError),

    /// The input document does not exist.
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// No strategy could open the document.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Model inference error.
    #[cfg(feature = "native")]
    #[error("inference error: {0}")]
    Inference(#[from] autofill_inference::InferenceError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Pages could not be rendered to images.
    #[error("failed to render pages: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors from the question-answering collaborator.
#[derive(Error, Debug)]
pub enum QaError {
    /// The model or tokenizer could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Tokenization failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Model execution failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The collaborator was never initialised or failed to initialise.
    #[error("question answering is unavailable")]
    Unavailable,
}

/// Errors raised by a page driver while manipulating the rendered page.
#[derive(Error, Debug)]
pub enum DriverError {
    /// An action did not complete in time.
    #[error("{action} timed out after {millis}ms")]
    Timeout { action: &'static str, millis: u64 },

    /// Navigation failed.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A page-context script failed or returned an unexpected value.
    #[error("script failed: {0}")]
    Script(String),

    /// The element is detached or cannot be interacted with.
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// Low-level protocol error from the browser.
    #[error("browser protocol error: {0}")]
    Protocol(String),

    /// The page or browser has been closed.
    #[error("page closed")]
    Closed,

    /// I/O error, e.g. while writing a screenshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors that abort a fill session.
#[derive(Error, Debug)]
pub enum FillError {
    /// The browser could not be launched.
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// The form page could not be loaded.
    #[error("failed to load {url}: {source}")]
    PageLoad {
        url: String,
        #[source]
        source: DriverError,
    },

    /// A driver failure outside of a single fill strategy.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The run was cancelled before the form was filled.
    #[error("interrupted")]
    Interrupted,
}

/// Result type for the autofill library.
pub type Result<T> = std::result::Result<T, AutofillError>;
