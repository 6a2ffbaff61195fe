//! Semantic identity fields and the per-document field map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed identity-document attributes the extractor looks for.
///
/// Serialized names match the keys callers use in fill requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Full person name.
    Name,
    /// Email address.
    Email,
    /// Mobile phone number.
    Phone,
    /// Aadhaar number (primary national identity number).
    Aadhaar,
    /// PAN (secondary national identity number).
    Pan,
    /// Six-digit postal index number.
    Pincode,
    /// First date found, usually the date of birth.
    Date,
    /// Postal address.
    Address,
}

impl FieldKind {
    /// All field kinds, in extraction order.
    pub const ALL: [FieldKind; 8] = [
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Aadhaar,
        FieldKind::Pan,
        FieldKind::Pincode,
        FieldKind::Date,
        FieldKind::Name,
        FieldKind::Address,
    ];

    /// Key used in JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Aadhaar => "aadhaar",
            FieldKind::Pan => "pan",
            FieldKind::Pincode => "pincode",
            FieldKind::Date => "date",
            FieldKind::Address => "address",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// Extracted field values keyed by [`FieldKind`].
///
/// At most one value per field; the first value inserted wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    values: BTreeMap<FieldKind, String>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value unless the field is already present or the value is blank.
    ///
    /// Returns `true` if the value was stored.
    pub fn insert(&mut self, kind: FieldKind, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.trim().is_empty() || self.values.contains_key(&kind) {
            return false;
        }
        self.values.insert(kind, value);
        true
    }

    /// Get the value for a field.
    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        self.values.get(&kind).map(String::as_str)
    }

    /// Whether a value exists for the field.
    pub fn contains(&self, kind: FieldKind) -> bool {
        self.values.contains_key(&kind)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field was found.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over present fields in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Field names present, for log messages.
    pub fn keys(&self) -> Vec<&'static str> {
        self.values.keys().map(FieldKind::as_str).collect()
    }
}

impl FromIterator<(FieldKind, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (FieldKind, String)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (kind, value) in iter {
            map.insert(kind, value);
        }
        map
    }
}
