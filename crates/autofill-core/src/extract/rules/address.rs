//! Address block detection.

use super::lines_with_offsets;
use super::patterns::ADDRESS_INDICATORS;
use crate::extract::{ExtractionMatch, FieldExtractor};

/// Lines following an indicator line that may belong to the address.
const FOLLOWING_LINES: usize = 3;

/// An address block must be longer than this many characters.
const MIN_ADDRESS_LENGTH: usize = 20;

/// Finds an address block opened by a relation marker (`S/O`, `C/O`, ...) or
/// a street word, and joins it with the lines that follow.
#[derive(Debug, Clone, Copy)]
pub struct AddressExtractor {
    max_length: usize,
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new(200)
    }
}

impl AddressExtractor {
    /// Extractor truncating addresses to `max_length` characters.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    fn has_indicator(line: &str) -> bool {
        let lower = line.to_lowercase();
        ADDRESS_INDICATORS.iter().any(|word| lower.contains(word))
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines: Vec<(usize, &str)> = lines_with_offsets(text).collect();
        let mut matches = Vec::new();

        for (i, &(offset, line)) in lines.iter().enumerate() {
            let line = line.trim();
            if !Self::has_indicator(line) {
                continue;
            }

            let mut parts = vec![line];
            let mut end = offset + lines[i].1.len();
            for &(next_offset, raw) in lines.iter().skip(i + 1).take(FOLLOWING_LINES) {
                let next = raw.trim();
                if next.chars().count() > 3 {
                    parts.push(next);
                    end = next_offset + raw.len();
                }
            }

            let address = parts.join(" ");
            if address.chars().count() > MIN_ADDRESS_LENGTH {
                let value: String = address.chars().take(self.max_length).collect();
                matches.push(ExtractionMatch::new(value, 0.7, &text[offset..end]).with_position(offset, end));
            }
        }

        matches
    }
}
