//! Source location tracking for error reporting.
//!
//! Tokens carry a [`Span`]; AST nodes and diagnostics keep only the line.
//! The synthetic end-of-input token uses [`Span::dummy`], which reports no
//! line at all.

use serde::Serialize;
use std::fmt;

/// A position in the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of the lexed text
    pub offset: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Location of the first character of a text.
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

/// A half-open region of the lexed text, as carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Start line (1-indexed, 0 for synthetic tokens)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line
    pub end_line: usize,
    /// End column (exclusive)
    pub end_column: usize,
    /// Byte offset of start
    pub start_offset: usize,
    /// Byte offset of end (exclusive)
    pub end_offset: usize,
}

impl Span {
    /// Create a span from start and end locations.
    pub fn from_locations(start: SourceLocation, end: SourceLocation) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
            start_offset: start.offset,
            end_offset: end.offset,
        }
    }

    /// The span of synthetic tokens (end-of-input marker).
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Check if this span belongs to a synthetic token.
    pub fn is_dummy(&self) -> bool {
        self.start_line == 0 && self.end_line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "end of input")
        } else if self.start_line == self.end_line {
            write!(f, "{}:{}-{}", self.start_line, self.start_column, self.end_column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start_line, self.start_column, self.end_line, self.end_column
            )
        }
    }
}

/// Line lookups over preprocessed text, so the CLI can echo the line a
/// parse error or diagnostic points at.
#[derive(Debug, Clone)]
pub struct SourceMap {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Index the line starts of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    /// The text of a 1-indexed line, without its newline.
    pub fn line(&self, line_number: usize) -> Option<&str> {
        let start = *self.line_starts.get(line_number.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line_number)
            .copied()
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span::from_locations(SourceLocation::new(1, 5, 4), SourceLocation::new(1, 10, 9));
        assert_eq!(format!("{}", span), "1:5-10");

        let span = Span::from_locations(SourceLocation::new(1, 5, 4), SourceLocation::new(3, 10, 30));
        assert_eq!(format!("{}", span), "1:5-3:10");

        assert_eq!(format!("{}", Span::dummy()), "end of input");
    }

    #[test]
    fn test_dummy_span() {
        assert!(Span::dummy().is_dummy());
        let span = Span::from_locations(SourceLocation::start(), SourceLocation::new(1, 5, 4));
        assert!(!span.is_dummy());
    }

    #[test]
    fn test_source_map() {
        let map = SourceMap::new("fish {\n  splash(1) <D\n}");

        assert_eq!(map.line(0), None);
        assert_eq!(map.line(1), Some("fish {"));
        assert_eq!(map.line(2), Some("  splash(1) <D"));
        assert_eq!(map.line(3), Some("}"));
        assert_eq!(map.line(4), None);
    }
}
