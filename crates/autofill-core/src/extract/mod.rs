//! Identity field extraction from acquired document text.

pub mod rules;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::fields::{FieldKind, FieldMap};
use crate::qa::QuestionAnswerer;
use rules::{AddressExtractor, NameExtractor, PatternExtractor};

const NAME_QUESTION: &str = "What is the person's full name?";
const ADDRESS_QUESTION: &str = "What is the complete address?";

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with its confidence and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Turns document text into a [`FieldMap`].
///
/// Regex fields are extracted first, then the name and address line
/// heuristics. When a heuristic finds nothing and an answerer is attached,
/// the question-answering model is asked instead. Fields are independent:
/// a failure for one never prevents another.
pub struct IdentityExtractor {
    config: ExtractionConfig,
    name: NameExtractor,
    address: AddressExtractor,
    answerer: Option<Arc<dyn QuestionAnswerer>>,
}

impl IdentityExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            name: NameExtractor::new(),
            address: AddressExtractor::new(config.address_max_length),
            config,
            answerer: None,
        }
    }

    /// Attach a question answerer for the name and address fallbacks.
    pub fn with_answerer(mut self, answerer: Arc<dyn QuestionAnswerer>) -> Self {
        self.answerer = Some(answerer);
        self
    }

    /// Extract every field found in `text`.
    pub fn extract(&self, text: &str) -> FieldMap {
        let mut fields = FieldMap::new();

        for kind in FieldKind::ALL {
            let value = match kind {
                FieldKind::Name => self.extract_name(text),
                FieldKind::Address => self.extract_address(text),
                _ => PatternExtractor::for_kind(kind)
                    .and_then(|extractor| extractor.extract(text))
                    .map(|m| m.value),
            };

            if let Some(value) = value {
                debug!("Found {}: {}", kind, value);
                fields.insert(kind, value);
            }
        }

        info!("Extracted {} fields: {:?}", fields.len(), fields.keys());
        fields
    }

    fn extract_name(&self, text: &str) -> Option<String> {
        self.name
            .extract(text)
            .map(|m| m.value)
            .or_else(|| self.ask(NAME_QUESTION, text, self.config.name_min_score))
    }

    fn extract_address(&self, text: &str) -> Option<String> {
        self.address
            .extract(text)
            .map(|m| m.value)
            .or_else(|| self.ask(ADDRESS_QUESTION, text, self.config.address_min_score))
    }

    /// Ask the model over the leading context; `None` unless the answer is
    /// non-empty and scores above `min_score`.
    fn ask(&self, question: &str, text: &str, min_score: f32) -> Option<String> {
        if !self.config.use_qa_fallback || text.chars().count() <= self.config.qa_min_text_length {
            return None;
        }
        let answerer = self.answerer.as_ref()?;

        let context: String = text.chars().take(self.config.qa_context_chars).collect();
        match answerer.answer(question, &context) {
            Ok(answer) => {
                let value = answer.text.trim();
                debug!("QA answered {:?} with score {:.3}", value, answer.score);
                (answer.score > min_score && !value.is_empty()).then(|| value.to_string())
            }
            Err(e) => {
                warn!("QA fallback failed for {:?}: {}", question, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;
    use crate::qa::{Answer, LazyAnswerer};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Answers every question with a fixed reply and records the context.
    struct FixedAnswerer {
        reply: &'static str,
        score: f32,
        contexts: Mutex<Vec<String>>,
    }

    impl FixedAnswerer {
        fn new(reply: &'static str, score: f32) -> Arc<Self> {
            Arc::new(Self {
                reply,
                score,
                contexts: Mutex::new(Vec::new()),
            })
        }
    }

    impl QuestionAnswerer for FixedAnswerer {
        fn answer(&self, _question: &str, context: &str) -> Result<Answer, QaError> {
            self.contexts.lock().unwrap().push(context.to_string());
            Ok(Answer {
                text: self.reply.to_string(),
                score: self.score,
            })
        }
    }

    fn extractor() -> IdentityExtractor {
        IdentityExtractor::new(ExtractionConfig::default())
    }

    #[test]
    fn test_identity_card_scenario() {
        let text = "John Michael Smith\nGovernment of India\nDOB: 01/02/1990\nEmail: john@x.com";
        let fields = extractor().extract(text);

        assert_eq!(fields.get(FieldKind::Name), Some("John Michael Smith"));
        assert_eq!(fields.get(FieldKind::Date), Some("01/02/1990"));
        assert_eq!(fields.get(FieldKind::Email), Some("john@x.com"));
        assert!(!fields.contains(FieldKind::Address));
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Ravi Kumar\nS/O Mohan Kumar\n12 MG Road\nBengaluru 560001\n1234 5678 9012\nABCDE1234F";
        let extractor = extractor();
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn test_numeric_fields_are_independent() {
        let fields = extractor().extract("UID 1234 5678 9012, PIN 560001");
        assert_eq!(fields.get(FieldKind::Aadhaar), Some("1234 5678 9012"));
        assert_eq!(fields.get(FieldKind::Pincode), Some("560001"));
        assert!(!fields.contains(FieldKind::Phone));
    }

    #[test]
    fn test_values_are_substrings() {
        let text = "Contact 9876543210 or mail a.b@c.org, PAN ABCDE1234F, PIN 560001";
        for (_, value) in extractor().extract(text).iter() {
            assert!(text.contains(value), "{} not in text", value);
        }
    }

    #[test]
    fn test_qa_fallback_for_name_and_address() {
        let answerer = FixedAnswerer::new("  Kavya Menon ", 0.35);
        let text = "KAVYA MENON 1990 / 123 / xyz long document text with nothing name-like at all";
        let fields = extractor().with_answerer(answerer.clone()).extract(text);

        assert_eq!(fields.get(FieldKind::Name), Some("Kavya Menon"));
        assert_eq!(fields.get(FieldKind::Address), Some("Kavya Menon"));
        assert_eq!(answerer.contexts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_qa_low_score_rejected() {
        let answerer = FixedAnswerer::new("Somebody", 0.25);
        let text = "0000 long document text without any usable name or address lines in it";
        let fields = extractor().with_answerer(answerer).extract(text);

        assert!(!fields.contains(FieldKind::Name));
        assert_eq!(fields.get(FieldKind::Address), Some("Somebody"));
    }

    #[test]
    fn test_qa_skipped_for_short_text() {
        let answerer = FixedAnswerer::new("Somebody", 0.99);
        let fields = extractor().with_answerer(answerer.clone()).extract("123");
        assert!(fields.is_empty());
        assert!(answerer.contexts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_qa_context_is_truncated() {
        let answerer = FixedAnswerer::new("", 0.9);
        let text = "9".repeat(5000);
        extractor().with_answerer(answerer.clone()).extract(&text);
        let contexts = answerer.contexts.lock().unwrap();
        assert!(contexts.iter().all(|c| c.chars().count() == 2000));
    }

    #[test]
    fn test_unavailable_answerer_is_harmless() {
        let text = "nothing name-like here, just a long run of lower case words and symbols !!";
        let fields = extractor()
            .with_answerer(Arc::new(LazyAnswerer::unavailable()))
            .extract(text);
        assert!(fields.is_empty());
    }
}
