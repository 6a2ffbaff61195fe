//! Person-name detection from document lines.

use super::patterns::{DIGIT_RUN, NAME_DENYLIST, NON_NAME_CHAR};
use super::{lines_with_offsets, trimmed_span};
use crate::extract::{ExtractionMatch, FieldExtractor};

/// Names shorter than this, in letters, lose to any longer candidate.
const PREFERRED_LETTERS: usize = 6;

/// Picks the most name-like line of a document.
///
/// A candidate line holds 2-4 capitalised alphabetic words, no digit runs and
/// no boilerplate vocabulary. The candidate with the most letters wins; the
/// first one wins ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameExtractor;

impl NameExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether a trimmed line looks like a person's name.
    pub fn is_candidate(line: &str) -> bool {
        let len = line.chars().count();
        if !(3..=100).contains(&len) {
            return false;
        }

        let lower = line.to_lowercase();
        if NAME_DENYLIST.iter().any(|word| lower.contains(word)) {
            return false;
        }

        if DIGIT_RUN.is_match(line) || NON_NAME_CHAR.is_match(line) {
            return false;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if !(2..=4).contains(&words.len()) {
            return false;
        }

        let all_alphabetic = words.iter().all(|w| {
            let bare = w.replace('.', "");
            !bare.is_empty() && bare.chars().all(char::is_alphabetic)
        });
        let capitalised = words[0].chars().next().is_some_and(char::is_uppercase);

        all_alphabetic && capitalised && letter_count(line) >= 4
    }
}

fn letter_count(line: &str) -> usize {
    line.chars().filter(|c| c.is_alphabetic()).count()
}

impl FieldExtractor for NameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let mut best: Option<ExtractionMatch<String>> = None;

        for candidate in self.extract_all(text) {
            let better = match &best {
                None => true,
                Some(current) => letter_count(&candidate.value) > letter_count(&current.value),
            };
            if better {
                best = Some(candidate);
            }
        }

        best.map(|mut m| {
            if letter_count(&m.value) < PREFERRED_LETTERS {
                m.confidence = 0.5;
            }
            m
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        lines_with_offsets(text)
            .filter(|(_, line)| Self::is_candidate(line.trim()))
            .map(|(offset, line)| {
                let (start, end) = trimmed_span(offset, line);
                ExtractionMatch::new(line.trim().to_string(), 0.8, line).with_position(start, end)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(text: &str) -> Option<String> {
        NameExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_identity_card_lines() {
        let text = "John Michael Smith\nGovernment of India\nDOB: 01/02/1990\nEmail: john@x.com";
        assert_eq!(name(text), Some("John Michael Smith".to_string()));
    }

    #[test]
    fn test_rejects_denylist_digits_and_symbols() {
        assert!(!NameExtractor::is_candidate("Unique Identification Authority"));
        assert!(!NameExtractor::is_candidate("Ravi Kumar 42"));
        assert!(!NameExtractor::is_candidate("Ravi, Kumar"));
        assert!(!NameExtractor::is_candidate("ravi kumar"));
        assert!(!NameExtractor::is_candidate("Ravi"));
        assert!(!NameExtractor::is_candidate("A B C D E"));
        assert!(NameExtractor::is_candidate("R. K. Sharma"));
    }

    #[test]
    fn test_longer_candidate_wins() {
        assert_eq!(name("Al Bo\nPriya Raman Iyer"), Some("Priya Raman Iyer".to_string()));
    }

    #[test]
    fn test_first_wins_on_ties() {
        assert_eq!(name("Anil Kapoor\nRavi Sharma"), Some("Anil Kapoor".to_string()));
    }

    #[test]
    fn test_short_name_still_returned_alone() {
        let m = NameExtractor::new().extract("Al Bo").unwrap();
        assert_eq!(m.value, "Al Bo");
        assert!(m.confidence < 0.8);
    }

    #[test]
    fn test_candidates_never_contain_digit_runs() {
        let text = "Flat 12 Main\nSita Devi\nGeeta 99 Rani\nIncome Tax Department";
        for candidate in NameExtractor::new().extract_all(text) {
            assert!(!DIGIT_RUN.is_match(&candidate.value));
            let lower = candidate.value.to_lowercase();
            assert!(NAME_DENYLIST.iter().all(|w| !lower.contains(w)));
        }
        assert_eq!(name(text), Some("Sita Devi".to_string()));
    }

    #[test]
    fn test_position_points_at_trimmed_line() {
        let text = "header\n   Meera Nair  \n";
        let m = NameExtractor::new().extract(text).unwrap();
        let (start, end) = m.position.unwrap();
        assert_eq!(&text[start..end], "Meera Nair");
    }
}
