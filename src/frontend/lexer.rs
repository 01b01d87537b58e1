//! Lexer for the Fish language.
//!
//! The lexer drives the shared [`Automaton`] over preprocessed text with
//! maximal munch. It never fails: input the automaton cannot accept comes out
//! as `Unrecognized` or `Invalid` tokens, and the parser reports them.

use crate::frontend::automaton::{fish_automaton, Automaton, Category, State};
use crate::frontend::token::{Token, TokenKind};
use crate::utils::location::{SourceLocation, Span};
use log::{debug, trace};
use std::iter::Peekable;
use std::str::Chars;
use unicode_xid::UnicodeXID;

/// Tokenize preprocessed text. The result carries no `Eof` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).tokenize()
}

/// Check if `c` may appear in an identifier as a letter.
pub fn is_letter(c: char) -> bool {
    c == '_' || c.is_xid_start()
}

/// A lexer for tokenizing source code.
pub struct Lexer<'a> {
    /// The source text
    source: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Transition table
    automaton: &'a Automaton,
    /// Current automaton state
    state: State,
    /// Current byte offset
    offset: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Start of current token
    token_start: SourceLocation,
    /// Tokens emitted so far
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the Fish automaton.
    pub fn new(source: &'a str) -> Self {
        Self::with_automaton(source, fish_automaton())
    }

    /// Create a lexer over an arbitrary automaton.
    pub fn with_automaton(source: &'a str, automaton: &'a Automaton) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            automaton,
            state: State::START,
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
            tokens: Vec::new(),
        }
    }

    /// Get the current location.
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    /// Create a span from token start to current location.
    fn make_span(&self) -> Span {
        Span::from_locations(self.token_start, self.current_location())
    }

    /// Text consumed since the token start.
    fn pending(&self) -> &'a str {
        &self.source[self.token_start.offset..self.offset]
    }

    /// Peek at the current character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume and return the current character.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Map a character to its input category. The answer depends on the
    /// current state: literal bodies swallow almost everything, and letters
    /// are only matched exactly where a reserved spelling continues.
    fn categorize(&self, c: char) -> Category {
        let state = self.state;
        if state.is_escape() {
            return Category::LiteralBody;
        }
        if state.is_literal_body() {
            let quote = if state == State::STRING_BODY { '"' } else { '\'' };
            return if c == quote || c == '\\' {
                Category::Exact(c)
            } else {
                Category::LiteralBody
            };
        }
        if c.is_ascii_digit() {
            Category::Digit
        } else if is_letter(c) {
            let exact = Category::Exact(c);
            let on_reserved_path = state == State::START || self.automaton.is_reserved_prefix(state);
            if on_reserved_path && self.automaton.has_edge(state, exact) {
                exact
            } else {
                Category::Letter
            }
        } else {
            Category::Exact(c)
        }
    }

    /// A broken reserved-word prefix (`fi` followed by `x`) continues as an
    /// identifier when the next character could extend one.
    fn can_become_identifier(&self, c: char) -> bool {
        let automaton = self.automaton;
        automaton.is_reserved_prefix(self.state)
            && !automaton.is_reserved_final(self.state)
            && self.pending().chars().next().map_or(false, is_letter)
            && (is_letter(c) || c.is_ascii_digit())
    }

    fn emit(&mut self, kind: TokenKind) {
        let span = self.make_span();
        let token = Token::new(kind, span, self.pending().to_string());
        trace!("token {} at {}", token, span);
        self.tokens.push(token);
        self.state = State::START;
        self.token_start = self.current_location();
    }

    /// Emit whatever is pending, classified by the current state.
    fn flush(&mut self) {
        if self.pending().is_empty() {
            self.state = State::START;
            return;
        }
        let kind = self
            .automaton
            .classify(self.state)
            .unwrap_or(TokenKind::Unrecognized);
        self.emit(kind);
    }

    /// A numeral ran into a letter: take the whole alphanumeric run.
    fn scan_invalid(&mut self) {
        while self.peek().map_or(false, |c| is_letter(c) || c.is_ascii_digit()) {
            self.advance();
        }
        self.emit(TokenKind::Invalid);
    }

    /// Collect all tokens into a vector.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if self.pending().is_empty() {
                self.token_start = self.current_location();
            }

            if c.is_whitespace() && !self.state.is_literal_body() {
                self.flush();
                self.advance();
                self.token_start = self.current_location();
                continue;
            }

            let category = self.categorize(c);
            if let Some(next) = self.automaton.step(self.state, category) {
                self.state = next;
                self.advance();
                continue;
            }

            // No transition: the character is retried unless consumed below.
            if self.can_become_identifier(c) {
                self.state = State::IDENT;
            } else if self.state.is_numeral() && is_letter(c) {
                self.scan_invalid();
            } else if self.pending().is_empty() {
                self.advance();
                self.emit(TokenKind::Unrecognized);
            } else {
                self.flush();
            }
        }
        self.flush();

        debug!("Lexed {} tokens", self.tokens.len());
        self.tokens
    }
}
