//! Regex patterns and word lists for identity-document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"
    ).unwrap();

    // Indian mobile numbers, optional +91 prefix
    pub static ref PHONE_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:\+91[\s-]?)?[6-9]\d{9}\b"
    ).unwrap();

    pub static ref AADHAAR_PATTERN: Regex = Regex::new(
        r"(?i)\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b"
    ).unwrap();

    pub static ref PAN_PATTERN: Regex = Regex::new(
        r"(?i)\b[A-Z]{5}\d{4}[A-Z]\b"
    ).unwrap();

    pub static ref PINCODE_PATTERN: Regex = Regex::new(
        r"(?i)\b\d{6}\b"
    ).unwrap();

    pub static ref DATE_PATTERN: Regex = Regex::new(
        r"(?i)\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b"
    ).unwrap();

    // Name line filters
    pub static ref DIGIT_RUN: Regex = Regex::new(r"\d{2,}").unwrap();

    pub static ref NON_NAME_CHAR: Regex = Regex::new(r"[^A-Za-z\s.]").unwrap();
}

/// Words that mark a line as document boilerplate rather than a name.
pub const NAME_DENYLIST: &[&str] = &[
    "government", "india", "aadhaar", "unique", "authority", "male", "female",
    "dob", "birth", "year", "card", "number", "address", "pin", "code", "state",
    "district", "post", "income", "tax", "department", "permanent", "account",
    "republic", "signature", "photo", "date", "issue", "issued", "enrollment",
    "help", "resident", "identity", "www", "uidai",
];

/// Phrases that open an address block.
pub const ADDRESS_INDICATORS: &[&str] = &[
    "s/o", "d/o", "w/o", "c/o", "son of", "daughter of", "wife of", "care of",
    "street", "road", "village",
];
