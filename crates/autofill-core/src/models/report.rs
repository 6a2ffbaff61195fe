//! Fill reports and caller-facing response shapes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::fields::{FieldKind, FieldMap};

/// Control-manipulation strategy that filled a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Typed into a text input or textarea.
    TextInput,
    /// Clicked a radio button, checkbox, or label.
    Choice,
    /// Selected an option of a `<select>`.
    Dropdown,
    /// Typed into a contenteditable region.
    EditableRegion,
    /// Wrote the value through a page script.
    ScriptWrite,
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FillStrategy::TextInput => "text input",
            FillStrategy::Choice => "choice",
            FillStrategy::Dropdown => "dropdown",
            FillStrategy::EditableRegion => "editable region",
            FillStrategy::ScriptWrite => "script write",
        };
        f.write_str(name)
    }
}

/// What happened to one counted question group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FillStatus {
    /// A strategy succeeded.
    Filled { strategy: FillStrategy },
    /// The label matched no field, or the field was not extracted.
    NoValue,
    /// Every strategy failed.
    Failed,
}

/// Per-question record in a [`FillReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// Position of the question group on the page (1-indexed).
    pub index: usize,
    /// Derived label text.
    pub label: String,
    /// Field the label matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldKind>,
    /// Outcome.
    #[serde(flatten)]
    pub status: FillStatus,
}

/// Aggregate result of one fill session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    /// Questions successfully filled.
    pub filled: usize,
    /// Questions with a usable label.
    pub total: usize,
    /// Full-page screenshot written after filling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// One entry per counted question.
    pub questions: Vec<QuestionOutcome>,
}

impl FillReport {
    /// Record a question outcome, keeping `filled <= total`.
    pub fn record(&mut self, outcome: QuestionOutcome) {
        self.total += 1;
        if matches!(outcome.status, FillStatus::Filled { .. }) {
            self.filled += 1;
        }
        self.questions.push(outcome);
    }

    /// Success rate formatted as a percentage, e.g. `"66.7%"`.
    pub fn success_rate(&self) -> String {
        if self.total == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.filled as f64 / self.total as f64 * 100.0)
        }
    }
}

/// Response for a document extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub success: bool,
    pub extracted_data: FieldMap,
    pub text_length: usize,
    pub message: String,
}

impl ExtractionResponse {
    pub fn new(fields: FieldMap, text_length: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully extracted {} fields", fields.len()),
            extracted_data: fields,
            text_length,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            extracted_data: FieldMap::new(),
            text_length: 0,
            message: message.into(),
        }
    }
}

/// Response for a form fill request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillResponse {
    pub success: bool,
    pub fields_filled: usize,
    pub total_fields: usize,
    pub success_rate: String,
    pub screenshot: Option<String>,
    pub message: String,
}

impl From<&FillReport> for FillResponse {
    fn from(report: &FillReport) -> Self {
        let success_rate = report.success_rate();
        Self {
            success: true,
            fields_filled: report.filled,
            total_fields: report.total,
            message: format!(
                "Successfully filled {}/{} fields ({})",
                report.filled, report.total, success_rate
            ),
            success_rate,
            screenshot: report
                .screenshot
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(index: usize, status: FillStatus) -> QuestionOutcome {
        QuestionOutcome {
            index,
            label: format!("Question {}", index),
            field: None,
            status,
        }
    }

    #[test]
    fn test_record_counts() {
        let mut report = FillReport::default();
        report.record(outcome(1, FillStatus::Filled { strategy: FillStrategy::TextInput }));
        report.record(outcome(2, FillStatus::NoValue));
        report.record(outcome(3, FillStatus::Failed));

        assert_eq!(report.filled, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.success_rate(), "33.3%");
    }

    #[test]
    fn test_empty_rate() {
        assert_eq!(FillReport::default().success_rate(), "0%");
    }

    #[test]
    fn test_fill_response_uses_file_name() {
        let report = FillReport {
            filled: 2,
            total: 4,
            screenshot: Some(PathBuf::from("outputs/filled_form.png")),
            questions: Vec::new(),
        };

        let response = FillResponse::from(&report);
        assert_eq!(response.screenshot.as_deref(), Some("filled_form.png"));
        assert_eq!(response.success_rate, "50.0%");
        assert_eq!(response.message, "Successfully filled 2/4 fields (50.0%)");
    }

    #[test]
    fn test_outcome_json() {
        let outcome = QuestionOutcome {
            index: 1,
            label: "Email".to_string(),
            field: Some(FieldKind::Email),
            status: FillStatus::Filled { strategy: FillStrategy::ScriptWrite },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "filled");
        assert_eq!(json["strategy"], "script_write");
        assert_eq!(json["field"], "email");
    }
}
