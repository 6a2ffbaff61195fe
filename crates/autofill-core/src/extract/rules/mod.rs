//! Rule-based field extractors for identity documents.

pub mod address;
pub mod identity;
pub mod name;
pub mod patterns;

pub use address::AddressExtractor;
pub use identity::PatternExtractor;
pub use name::NameExtractor;
pub use patterns::*;

/// Lines of `text` with the byte offset at which each starts.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len() + 1;
        Some((start, line))
    })
}

/// Byte range of the trimmed content of a line starting at `offset`.
pub(crate) fn trimmed_span(offset: usize, line: &str) -> (usize, usize) {
    let start = offset + (line.len() - line.trim_start().len());
    (start, start + line.trim().len())
}
