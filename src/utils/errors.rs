//! Error types for the Fish front end.
//!
//! Errors are organised by the stage that produces them. Lexical anomalies
//! are not errors at all: they travel downstream as `Unrecognized`/`Invalid`
//! tokens until the parser trips over them.

use crate::utils::location::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Top-level error type for a front-end run.
#[derive(Error, Debug)]
pub enum FishError {
    /// The token stream violated the grammar
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The program parsed but the analyzer reported findings
    #[error("{} semantic error(s) found", .0.len())]
    Semantic(Vec<Diagnostic>),
}

impl FishError {
    /// Diagnostics carried by a semantic failure; empty for other variants.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            FishError::Semantic(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

/// A structural violation found by the parser. Parsing stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Span of the offending token
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// Expected token kinds (if applicable)
    pub expected: Vec<String>,
    /// What was found
    pub found: Option<String>,
}

impl ParseError {
    /// Line of the offending token, `None` at the synthetic end of input.
    pub fn line(&self) -> Option<usize> {
        if self.span.is_dummy() {
            None
        } else {
            Some(self.span.start_line)
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "[line {}] {}", line, self.message)?,
            None => write!(f, "[end of input] {}", self.message)?,
        }
        if !self.expected.is_empty() {
            write!(f, " (expected: {})", self.expected.join(", "))?;
        }
        if let Some(ref found) = self.found {
            write!(f, " (found: {})", found)?;
        }
        Ok(())
    }
}

/// Which rule of the grammar a [`ParseError`] violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `match` saw a different token kind than the production requires
    ExpectedToken,
    /// The token is in neither the FIRST nor the FOLLOW set of a nonterminal
    UnexpectedToken,
    /// An expression was required
    ExpectedExpression,
    /// A type keyword was required
    ExpectedType,
    /// Tokens remain after the program production completed
    TrailingInput,
}

/// A semantic finding. Accumulated by the analyzer, never thrown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Human-readable description
    pub message: String,
    /// Source line of the node that triggered it
    pub line: usize,
    /// The kind of semantic error
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.line, self.message)
    }
}

/// Category of a semantic [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Variable used or assigned without a reachable declaration
    UndeclaredVariable,
    /// Call to a name missing from the function table
    UndeclaredFunction,
    /// Variable declared twice in one scope
    Redeclaration,
    /// Function name already present in the function table
    DuplicateFunction,
    /// Argument count differs from the parameter count
    ArityMismatch,
    /// Incompatible types in an initializer, assignment, argument, return or operator
    TypeMismatch,
    /// `emerge` outside any function body
    ReturnOutsideFunction,
}

/// Result type using FishError.
pub type FishResult<T> = Result<T, FishError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::location::SourceLocation;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError {
            message: "Unexpected token in ARGS".to_string(),
            span: Span::from_locations(SourceLocation::new(3, 5, 20), SourceLocation::new(3, 7, 22)),
            kind: ParseErrorKind::UnexpectedToken,
            expected: vec!["')'".to_string()],
            found: Some("'<D'".to_string()),
        };
        let s = format!("{}", err);
        assert!(s.starts_with("[line 3] Unexpected token in ARGS"));
        assert!(s.contains("')'"));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_parse_error_at_end_of_input() {
        let err = ParseError {
            message: "Missing '}'".to_string(),
            span: Span::dummy(),
            kind: ParseErrorKind::ExpectedToken,
            expected: Vec::new(),
            found: None,
        };
        assert_eq!(err.line(), None);
        assert_eq!(format!("{}", err), "[end of input] Missing '}'");
    }

    #[test]
    fn test_semantic_error_counts_diagnostics() {
        let err = FishError::Semantic(vec![
            Diagnostic::new(DiagnosticKind::UndeclaredVariable, 2, "variable 'y' is not declared"),
            Diagnostic::new(DiagnosticKind::Redeclaration, 4, "variable 'x' is already declared in this scope"),
        ]);
        assert_eq!(format!("{}", err), "2 semantic error(s) found");
        assert_eq!(err.diagnostics().len(), 2);
    }
}
