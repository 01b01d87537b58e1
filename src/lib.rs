//! # fishc - Front end for the Fish language
//!
//! A compiler front end for Fish, a small imperative language spelled with
//! `<`-prefixed operators and type names:
//! - Comment removal and whitespace policy
//! - Table-driven lexing (a DFA built from the reserved spellings)
//! - LL(1) recursive descent parsing into a generic AST
//! - Scope and type checking with accumulated diagnostics
//!
//! ## Architecture
//!
//! ```text
//! Source → Preprocess → Lexer → Parser → AST → Semantic Analysis → Diagnostics
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fishc::{check, FrontendConfig};
//!
//! let source = r#"
//!     fish {
//!         <int x <= 5 <D  ~~ a declaration
//!         splash(x) <D
//!     }
//! "#;
//!
//! let ast = check(source, &FrontendConfig::default()).unwrap();
//! assert_eq!(ast.to_string(), "Program(Block(Declaration(x, Type(int), Initializer(Num(5))), Print(Var(x))))");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frontend;
pub mod utils;

use frontend::ast::Node;
use log::{debug, info};
use utils::errors::{FishError, FishResult, ParseError};

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::ast::{Node, NodeKind, Type};
    pub use crate::frontend::token::{Token, TokenKind};
    pub use crate::frontend::{analyze, preprocess, tokenize, Lexer, Parser, SemanticAnalyzer};
    pub use crate::utils::errors::*;
    pub use crate::{check, parse, FrontendConfig, WhitespaceMode};
}

/// What the preprocessor does with whitespace once comments are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Remove every whitespace character. Adjacent words merge, and every
    /// token ends up on line 1.
    Strip,
    /// Keep layout and normalise line endings to `\n`.
    #[default]
    Preserve,
}

/// Configuration for the front-end pipeline.
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    /// Whitespace policy applied by the preprocessor
    pub whitespace: WhitespaceMode,
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Preprocess, lex and parse source text.
pub fn parse(source: &str, config: &FrontendConfig) -> Result<Node, ParseError> {
    let text = frontend::preprocess(source, config.whitespace);
    debug!("Preprocessed {} bytes into {}", source.len(), text.len());
    frontend::parse(&text)
}

/// Full pipeline: parse, then run semantic analysis.
///
/// Fails with [`FishError::Semantic`] exactly when analysis reports at
/// least one diagnostic.
pub fn check(source: &str, config: &FrontendConfig) -> FishResult<Node> {
    let ast = parse(source, config)?;
    let diagnostics = frontend::analyze(&ast);
    if diagnostics.is_empty() {
        info!("No semantic errors found");
        Ok(ast)
    } else {
        Err(FishError::Semantic(diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::NodeKind;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FrontendConfig::default();
        assert_eq!(config.whitespace, WhitespaceMode::Preserve);
    }

    #[test]
    fn test_check_clean_program() {
        let ast = check("fish { <int x <= 5 <D splash ( x ) <D }", &FrontendConfig::default()).unwrap();
        assert_eq!(ast.kind, NodeKind::Program);
    }

    #[test]
    fn test_check_reports_diagnostics() {
        let err = check("fish { emerge 1 <D }", &FrontendConfig::default()).unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
    }

    #[test]
    fn test_check_parse_failure() {
        let err = check("fish { <int x <= 5 }", &FrontendConfig::default()).unwrap_err();
        assert!(matches!(err, FishError::Parse(_)));
    }

    #[test]
    fn test_strip_mode_parses_compact_source() {
        let config = FrontendConfig {
            whitespace: WhitespaceMode::Strip,
        };
        let ast = parse("fish {\n  <int x <= 5 <D\n  splash(x) <D\n}", &config).unwrap();
        let mut lines = Vec::new();
        ast.walk(&mut |node| lines.push(node.line));
        assert!(lines.iter().all(|&line| line == 1));
    }
}
