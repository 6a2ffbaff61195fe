//! Inference backend implementations.

pub mod ort;

use crate::{InputTensor, OutputTensor, Result};

/// Trait for ONNX inference backends.
///
/// Inputs and outputs are passed by name so that callers can adapt to
/// models exported with or without optional inputs such as
/// `token_type_ids`.
pub trait InferenceBackend: Send + Sync {
    /// Run inference with the given named inputs.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Get the input names expected by the model.
    fn input_names(&self) -> &[String];

    /// Get the output names produced by the model.
    fn output_names(&self) -> &[String];

    /// Whether the model declares an input with the given name.
    fn has_input(&self, name: &str) -> bool {
        self.input_names().iter().any(|n| n == name)
    }
}
