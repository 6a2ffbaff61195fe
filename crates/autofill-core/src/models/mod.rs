//! Data models: configuration, extracted fields, and fill reports.

pub mod config;
pub mod fields;
pub mod report;

pub use config::AutofillConfig;
pub use fields::{FieldKind, FieldMap};
pub use report::{ExtractionResponse, FillReport, FillResponse, FillStatus, FillStrategy, QuestionOutcome};
