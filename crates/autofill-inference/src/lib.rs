//! ONNX inference layer for autofill.
//!
//! The question-answering fallback of the field extractor runs a
//! SQuAD-style transformer exported to ONNX. This crate hides the runtime
//! behind [`InferenceBackend`] so the extractor can be tested with a fake
//! model and run natively through `ort`.

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use backend::ort::OrtBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
