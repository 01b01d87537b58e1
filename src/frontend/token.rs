//! Token types for the Fish language.
//!
//! This module defines all token kinds produced by the lexer, together with
//! the spelling tables the automaton is generated from.

use crate::frontend::ast::Type;
use crate::utils::location::Span;
use serde::Serialize;
use std::fmt;

/// A token in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source span
    pub span: Span,
    /// The lexeme (raw text)
    pub lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// The synthetic end-of-input token.
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, Span::dummy(), "$".to_string())
    }

    /// Source line, `None` for synthetic tokens.
    pub fn line(&self) -> Option<usize> {
        if self.span.is_dummy() {
            None
        } else {
            Some(self.span.start_line)
        }
    }

    /// Check if this is an EOF token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literals
    /// Integer or decimal literal
    Number,
    /// String literal, quotes included
    String,
    /// Character literal, quotes included
    Char,

    // Identifiers
    /// Identifier (variable, function name)
    Identifier,

    // Keywords
    /// `fish`
    Main,
    /// `fishtion`
    Function,
    /// `if`
    If,
    /// `else`
    Else,
    /// `whale`
    While,
    /// `fork`
    For,
    /// `try`
    Try,
    /// `catch`
    Catch,
    /// `finally`
    Finally,
    /// `splash`
    Print,
    /// `emerge`
    Return,

    /// `<int`, `<string`, `<charal`, `<bubble`, `<hook`
    Type(Type),

    // Arithmetic operators
    /// `<+`
    Plus,
    /// `<-`
    Minus,
    /// `<*`
    Star,
    /// `</`
    Slash,
    /// `<%`
    Percent,

    // Comparison operators
    /// `<<`
    Less,
    /// `<<>`
    Greater,
    /// `<<=`
    LessEqual,
    /// `<<>=`
    GreaterEqual,
    /// `<==`
    EqualEqual,
    /// `<!=`
    BangEqual,

    /// `<=`
    Assign,
    /// `<++`
    Increment,
    /// `<--`
    Decrement,
    /// `<D`
    Delimiter,

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,

    // Special
    /// A run the automaton could not accept
    Unrecognized,
    /// A numeral immediately followed by letters, e.g. `123abc`
    Invalid,
    /// Synthetic end of input
    Eof,
}

/// Letter-initial reserved words.
pub const WORD_KEYWORDS: &[(&str, TokenKind)] = &[
    ("fish", TokenKind::Main),
    ("fishtion", TokenKind::Function),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("whale", TokenKind::While),
    ("fork", TokenKind::For),
    ("try", TokenKind::Try),
    ("catch", TokenKind::Catch),
    ("finally", TokenKind::Finally),
    ("splash", TokenKind::Print),
    ("emerge", TokenKind::Return),
];

/// `<`-initial reserved spellings: operators, the delimiter and type keywords.
pub const ANGLE_KEYWORDS: &[(&str, TokenKind)] = &[
    ("<=", TokenKind::Assign),
    ("<+", TokenKind::Plus),
    ("<-", TokenKind::Minus),
    ("<*", TokenKind::Star),
    ("</", TokenKind::Slash),
    ("<%", TokenKind::Percent),
    ("<<", TokenKind::Less),
    ("<<>", TokenKind::Greater),
    ("<<=", TokenKind::LessEqual),
    ("<<>=", TokenKind::GreaterEqual),
    ("<==", TokenKind::EqualEqual),
    ("<!=", TokenKind::BangEqual),
    ("<++", TokenKind::Increment),
    ("<--", TokenKind::Decrement),
    ("<D", TokenKind::Delimiter),
    ("<int", TokenKind::Type(Type::Int)),
    ("<string", TokenKind::Type(Type::String)),
    ("<charal", TokenKind::Type(Type::Char)),
    ("<bubble", TokenKind::Type(Type::Float)),
    ("<hook", TokenKind::Type(Type::Bool)),
];

/// Single-character punctuation.
pub const PUNCTUATION: &[(char, TokenKind)] = &[
    ('(', TokenKind::LeftParen),
    (')', TokenKind::RightParen),
    ('[', TokenKind::LeftBracket),
    (']', TokenKind::RightBracket),
    ('{', TokenKind::LeftBrace),
    ('}', TokenKind::RightBrace),
    (',', TokenKind::Comma),
    ('.', TokenKind::Dot),
];

impl TokenKind {
    /// Check if this is a type keyword.
    pub fn is_type(&self) -> bool {
        matches!(self, TokenKind::Type(_))
    }

    /// The canonical operator symbol stored in AST nodes.
    pub fn operator_symbol(&self) -> Option<&'static str> {
        use TokenKind::*;
        let symbol = match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqualEqual => "==",
            BangEqual => "!=",
            Increment => "++",
            Decrement => "--",
            _ => return None,
        };
        Some(symbol)
    }

    /// Get a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            String => "string literal",
            Char => "character literal",
            Identifier => "identifier",
            Main => "fish",
            Function => "fishtion",
            If => "if",
            Else => "else",
            While => "whale",
            For => "fork",
            Try => "try",
            Catch => "catch",
            Finally => "finally",
            Print => "splash",
            Return => "emerge",
            TokenKind::Type(ty) => ty.keyword(),
            Plus => "<+",
            Minus => "<-",
            Star => "<*",
            Slash => "</",
            Percent => "<%",
            Less => "<<",
            Greater => "<<>",
            LessEqual => "<<=",
            GreaterEqual => "<<>=",
            EqualEqual => "<==",
            BangEqual => "<!=",
            Assign => "<=",
            Increment => "<++",
            Decrement => "<--",
            Delimiter => "<D",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftBrace => "{",
            RightBrace => "}",
            Comma => ",",
            Dot => ".",
            Unrecognized => "unrecognized input",
            Invalid => "invalid numeral",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
