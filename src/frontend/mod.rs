//! Frontend: preprocessing, lexing, parsing and semantic analysis for Fish.
//!
//! ## Language Overview
//!
//! Fish is a small statically typed imperative language whose operators
//! and type names all start with `<`, and whose statements end with `<D`:
//!
//! ```text
//! fish {
//!     fishtion square(<int n) <int {
//!         emerge n <* n <D
//!     }
//!     <int x <= square(5) <D
//!     splash(x) <D
//! }
//! ```
//!
//! The stages run in order: [`preprocess`] strips comments, [`tokenize`]
//! drives the table automaton, [`Parser`] builds the [`Node`] tree and
//! [`analyze`] reports [`Diagnostic`](crate::utils::errors::Diagnostic)s.

pub mod preprocess;
pub mod automaton;
pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod semantic;

// Re-exports
pub use lexer::{tokenize, Lexer};
pub use parser::Parser;
pub use ast::{Node, NodeKind, Type};
pub use token::{Token, TokenKind};
pub use semantic::{analyze, SemanticAnalyzer};
pub use preprocess::preprocess;
pub use crate::utils::errors::{Diagnostic, ParseError};

/// Parse already preprocessed text into an AST.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    Parser::new(tokenize(text)).parse()
}

/// Parse and perform semantic analysis, returning the tree together with
/// every diagnostic found.
pub fn parse_and_analyze(text: &str) -> Result<(Node, Vec<Diagnostic>), ParseError> {
    let ast = parse(text)?;
    let diagnostics = analyze(&ast);
    Ok((ast, diagnostics))
}
