//! Question label to field resolution.

use crate::models::fields::{FieldKind, FieldMap};

/// Keyword sets, tested in order. The first set with a keyword contained in
/// the lowercased label decides the field.
const KEYWORDS: &[(FieldKind, &[&str])] = &[
    (FieldKind::Name, &["name", "naam", "full name", "your name", "applicant"]),
    (FieldKind::Email, &["email", "e-mail", "mail", "electronic"]),
    (FieldKind::Phone, &["phone", "mobile", "contact", "telephone", "cell"]),
    (FieldKind::Aadhaar, &["aadhaar", "aadhar", "adhaar", "uid", "unique"]),
    (FieldKind::Pan, &["pan", "permanent account"]),
    (FieldKind::Address, &["address", "location", "residence", "residential", "street"]),
    (FieldKind::Pincode, &["pin", "postal", "zip", "pincode"]),
    (FieldKind::Date, &["dob", "birth", "date"]),
];

/// Maps free-text question labels to identity fields by keyword.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldMatcher;

impl FieldMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Field a label asks for, if any keyword matches.
    pub fn match_label(&self, label: &str) -> Option<FieldKind> {
        let label = label.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| label.contains(w)))
            .map(|(kind, _)| *kind)
    }

    /// Field and value for a label. `None` when no keyword matches or the
    /// matched field was not extracted.
    pub fn resolve<'a>(&self, label: &str, fields: &'a FieldMap) -> Option<(FieldKind, &'a str)> {
        let kind = self.match_label(label)?;
        fields.get(kind).map(|value| (kind, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_common_labels() {
        let matcher = FieldMatcher::new();
        let cases = [
            ("What is your Aadhaar Number?", Some(FieldKind::Aadhaar)),
            ("Full Name", Some(FieldKind::Name)),
            ("E-mail ID", Some(FieldKind::Email)),
            ("Mobile No.", Some(FieldKind::Phone)),
            ("PAN", Some(FieldKind::Pan)),
            ("Residential Address", Some(FieldKind::Address)),
            ("Postal Code", Some(FieldKind::Pincode)),
            ("Date of Birth", Some(FieldKind::Date)),
            ("Favourite colour", None),
        ];

        for (label, expected) in cases {
            assert_eq!(matcher.match_label(label), expected, "{}", label);
        }
    }

    #[test]
    fn test_earlier_set_wins() {
        // "name" is tested before "email".
        assert_eq!(FieldMatcher::new().match_label("Username for email"), Some(FieldKind::Name));
    }

    #[test]
    fn test_deterministic() {
        let matcher = FieldMatcher::new();
        let label = "Contact Address";
        assert_eq!(matcher.match_label(label), matcher.match_label(label));
        assert_eq!(matcher.match_label(label), Some(FieldKind::Phone));
    }

    #[test]
    fn test_resolve_requires_value() {
        let mut fields = FieldMap::new();
        fields.insert(FieldKind::Email, "john@x.com");

        let matcher = FieldMatcher::new();
        assert_eq!(matcher.resolve("Email", &fields), Some((FieldKind::Email, "john@x.com")));
        assert_eq!(matcher.resolve("Phone", &fields), None);
        assert_eq!(matcher.resolve("Hobby", &fields), None);
    }
}
