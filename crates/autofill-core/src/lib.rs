//! Core library for document-driven form autofill.
//!
//! This crate provides:
//! - PDF text acquisition with text-layer parsing and OCR fallback
//! - Identity field extraction (name, address, email, phone, Aadhaar, PAN,
//!   PIN code, dates) with an optional question-answering fallback
//! - Form inspection, label matching, and control filling over an abstract
//!   page driver

pub mod acquire;
pub mod error;
pub mod extract;
pub mod form;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod qa;

pub use acquire::{ExtractedText, TextAcquirer, TextFragment, TextSource};
pub use error::{AutofillError, DriverError, FillError, OcrError, PdfError, QaError, Result};
pub use extract::{ExtractionMatch, FieldExtractor, IdentityExtractor};
pub use form::{
    normalize_form_url, FieldFiller, FieldMatcher, FormElement, FormFillSession, FormInspector, FormPage,
    QuestionGroup, SessionState,
};
pub use models::config::AutofillConfig;
pub use models::fields::{FieldKind, FieldMap};
pub use models::report::{ExtractionResponse, FillReport, FillResponse, FillStatus, FillStrategy, QuestionOutcome};
pub use pipeline::{DocumentPipeline, ExtractionOutput};
pub use qa::{Answer, LazyAnswerer, QuestionAnswerer};

#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
#[cfg(feature = "native")]
pub use qa::BertQa;
