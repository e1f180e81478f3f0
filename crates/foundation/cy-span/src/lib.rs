//! Byte spans into source text

use derive_more::Display;
use std::ops::Range;

/// A byte offset span into a source unit's text
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq)]
#[display("{start}..{end}")]
pub struct Span {
    /// First byte covered
    pub start: u32,
    /// One past the last byte covered
    pub end: u32,
}

impl Span {
    /// Creates a span over `start..end`
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The span as a slice range
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_range_and_len() {
        let span = Span::new(4, 10);
        assert_eq!(span.range(), 4..10);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn display_form() {
        assert_eq!(Span::new(1, 2).to_string(), "1..2");
    }
}
