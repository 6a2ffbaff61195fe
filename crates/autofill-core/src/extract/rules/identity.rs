//! Single-pattern field extractors.

use regex::Regex;

use super::patterns::*;
use crate::extract::{ExtractionMatch, FieldExtractor};
use crate::models::fields::FieldKind;

/// Extracts a field by its regex; the first match in the text wins.
#[derive(Debug, Clone, Copy)]
pub struct PatternExtractor {
    kind: FieldKind,
    pattern: &'static Regex,
}

impl PatternExtractor {
    /// Extractor for a regex-backed field. `Name` and `Address` use line
    /// heuristics instead and return `None`.
    pub fn for_kind(kind: FieldKind) -> Option<Self> {
        let pattern: &'static Regex = match kind {
            FieldKind::Email => &*EMAIL_PATTERN,
            FieldKind::Phone => &*PHONE_PATTERN,
            FieldKind::Aadhaar => &*AADHAAR_PATTERN,
            FieldKind::Pan => &*PAN_PATTERN,
            FieldKind::Pincode => &*PINCODE_PATTERN,
            FieldKind::Date => &*DATE_PATTERN,
            FieldKind::Name | FieldKind::Address => return None,
        };
        Some(Self { kind, pattern })
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl FieldExtractor for PatternExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .find_iter(text)
            .filter_map(|m| {
                let value = m.as_str().trim();
                (!value.is_empty()).then(|| {
                    ExtractionMatch::new(value.to_string(), 0.9, m.as_str())
                        .with_position(m.start(), m.end())
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first(kind: FieldKind, text: &str) -> Option<String> {
        PatternExtractor::for_kind(kind)
            .unwrap()
            .extract(text)
            .map(|m| m.value)
    }

    #[test]
    fn test_email() {
        assert_eq!(first(FieldKind::Email, "Email: john@x.com"), Some("john@x.com".to_string()));
        assert_eq!(first(FieldKind::Email, "no address here"), None);
    }

    #[test]
    fn test_phone_with_country_code() {
        assert_eq!(first(FieldKind::Phone, "Mobile: +91 9876543210"), Some("9876543210".to_string()));
        assert_eq!(first(FieldKind::Phone, "Mobile 5876543210"), None);
    }

    #[test]
    fn test_aadhaar_grouped() {
        assert_eq!(first(FieldKind::Aadhaar, "UID 1234 5678 9012"), Some("1234 5678 9012".to_string()));
        assert_eq!(first(FieldKind::Aadhaar, "UID 1234-5678-9012"), Some("1234-5678-9012".to_string()));
    }

    #[test]
    fn test_pan_case_insensitive() {
        assert_eq!(first(FieldKind::Pan, "PAN: ABCDE1234F"), Some("ABCDE1234F".to_string()));
        assert_eq!(first(FieldKind::Pan, "pan abcde1234f"), Some("abcde1234f".to_string()));
    }

    #[test]
    fn test_pincode_and_date() {
        assert_eq!(first(FieldKind::Pincode, "Bengaluru 560001"), Some("560001".to_string()));
        assert_eq!(first(FieldKind::Date, "DOB: 01/02/1990"), Some("01/02/1990".to_string()));
        assert_eq!(first(FieldKind::Date, "Issued 5-11-22"), Some("5-11-22".to_string()));
    }

    #[test]
    fn test_first_match_and_position() {
        let text = "a@b.io then c@d.io";
        let extractor = PatternExtractor::for_kind(FieldKind::Email).unwrap();
        let all = extractor.extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "a@b.io");
        assert_eq!(all[0].position, Some((0, 6)));
        assert_eq!(&text[all[1].position.unwrap().0..all[1].position.unwrap().1], "c@d.io");
    }

    #[test]
    fn test_line_fields_have_no_pattern() {
        assert!(PatternExtractor::for_kind(FieldKind::Name).is_none());
        assert!(PatternExtractor::for_kind(FieldKind::Address).is_none());
    }
}
