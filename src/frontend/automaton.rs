//! Finite automaton driving the lexer.
//!
//! The automaton is pure data: a sparse `(state, category) -> state` table, a
//! map from accepting states to the token kind they produce, and two marker
//! sets for reserved-word disambiguation. What to do when a lookup fails is
//! the lexer's business.
//!
//! Reserved spellings are compiled into a trie rooted at the start state.
//! Letters on a trie path are matched by their exact character, so the
//! prefix `fi` of `fish` is a different state from the identifier state.
//! A *reserved-prefix* state still lies on some reserved spelling; a
//! *reserved-final* state completes one.

use crate::frontend::token::{TokenKind, ANGLE_KEYWORDS, PUNCTUATION, WORD_KEYWORDS};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// An automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(pub u16);

impl State {
    /// Initial state of every token
    pub const START: State = State(0);
    /// Identifier in progress
    pub const IDENT: State = State(1);
    /// Integer part of a numeral
    pub const NUMBER: State = State(2);
    /// Numeral followed by `.`, waiting for a digit
    pub const NUMBER_DOT: State = State(3);
    /// Fractional part of a numeral
    pub const FLOAT: State = State(4);
    /// Inside `"..."`
    pub const STRING_BODY: State = State(5);
    /// After `\` inside a string
    pub const STRING_ESCAPE: State = State(6);
    /// Closing `"` seen
    pub const STRING_END: State = State(7);
    /// After the opening `'`
    pub const CHAR_OPEN: State = State(8);
    /// After `\` inside a character literal
    pub const CHAR_ESCAPE: State = State(9);
    /// One character read, waiting for the closing `'`
    pub const CHAR_BODY: State = State(10);
    /// Closing `'` seen
    pub const CHAR_END: State = State(11);

    const FIRST_DYNAMIC: u16 = 12;

    /// Check if this state belongs to the numeral sub-machine.
    pub fn is_numeral(&self) -> bool {
        matches!(*self, State::NUMBER | State::NUMBER_DOT | State::FLOAT)
    }

    /// Check if this state scans the inside of a string or character literal.
    pub fn is_literal_body(&self) -> bool {
        matches!(
            *self,
            State::STRING_BODY
                | State::STRING_ESCAPE
                | State::CHAR_OPEN
                | State::CHAR_ESCAPE
                | State::CHAR_BODY
        )
    }

    /// Check if the next character is taken verbatim, whatever it is.
    pub fn is_escape(&self) -> bool {
        matches!(*self, State::STRING_ESCAPE | State::CHAR_ESCAPE)
    }
}

/// Symbolic input class of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Any identifier letter (including `_`)
    Letter,
    /// ASCII digit
    Digit,
    /// One specific character
    Exact(char),
    /// Any character inside a literal body
    LiteralBody,
}

/// Deterministic finite automaton over [`Category`] inputs.
#[derive(Debug, Clone)]
pub struct Automaton {
    transitions: HashMap<(State, Category), State>,
    accepting: HashMap<State, TokenKind>,
    reserved_prefix: HashSet<State>,
    reserved_final: HashSet<State>,
}

impl Automaton {
    /// Create an automaton from `(from, to, category)` triples and the
    /// accepting states. The start state is always [`State::START`].
    pub fn new(
        triples: impl IntoIterator<Item = (State, State, Category)>,
        accepting: impl IntoIterator<Item = (State, TokenKind)>,
    ) -> Self {
        Self {
            transitions: triples
                .into_iter()
                .map(|(from, to, category)| ((from, category), to))
                .collect(),
            accepting: accepting.into_iter().collect(),
            reserved_prefix: HashSet::new(),
            reserved_final: HashSet::new(),
        }
    }

    /// Attach the reserved-word marker sets.
    pub fn with_reserved(
        mut self,
        prefix: impl IntoIterator<Item = State>,
        finals: impl IntoIterator<Item = State>,
    ) -> Self {
        self.reserved_prefix = prefix.into_iter().collect();
        self.reserved_final = finals.into_iter().collect();
        self
    }

    /// Look up the transition for `(state, category)`.
    pub fn step(&self, state: State, category: Category) -> Option<State> {
        self.transitions.get(&(state, category)).copied()
    }

    /// Check if a transition exists.
    pub fn has_edge(&self, state: State, category: Category) -> bool {
        self.transitions.contains_key(&(state, category))
    }

    /// Token kind produced by an accepting state.
    pub fn classify(&self, state: State) -> Option<TokenKind> {
        self.accepting.get(&state).copied()
    }

    /// Whether `state` ends a complete token.
    pub fn is_accepting(&self, state: State) -> bool {
        self.accepting.contains_key(&state)
    }

    /// Whether `state` lies on the path of a reserved spelling without
    /// completing it.
    pub fn is_reserved_prefix(&self, state: State) -> bool {
        self.reserved_prefix.contains(&state)
    }

    /// Whether `state` completes a reserved spelling.
    pub fn is_reserved_final(&self, state: State) -> bool {
        self.reserved_final.contains(&state)
    }

    /// Number of transitions in the table.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// Incremental construction of an [`Automaton`].
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    transitions: HashMap<(State, Category), State>,
    accepting: HashMap<State, TokenKind>,
    reserved_prefix: HashSet<State>,
    reserved_final: HashSet<State>,
    next_state: u16,
}

impl AutomatonBuilder {
    /// Start from the fixed states, with no reserved spellings.
    pub fn new() -> Self {
        Self {
            next_state: State::FIRST_DYNAMIC,
            ..Default::default()
        }
    }

    fn fresh(&mut self) -> State {
        let state = State(self.next_state);
        self.next_state += 1;
        state
    }

    /// Add a transition.
    pub fn edge(&mut self, from: State, to: State, category: Category) -> &mut Self {
        self.transitions.insert((from, category), to);
        self
    }

    /// Mark a state as accepting.
    pub fn accept(&mut self, state: State, kind: TokenKind) -> &mut Self {
        self.accepting.insert(state, kind);
        self
    }

    /// Follow or create the trie path for `spelling`, returning every state
    /// visited after the start state.
    fn trie_path(&mut self, spelling: &str) -> Vec<State> {
        let mut state = State::START;
        let mut path = Vec::with_capacity(spelling.len());
        for c in spelling.chars() {
            let category = Category::Exact(c);
            state = match self.transitions.get(&(state, category)) {
                Some(&next) => next,
                None => {
                    let next = self.fresh();
                    self.transitions.insert((state, category), next);
                    next
                }
            };
            path.push(state);
        }
        path
    }

    /// Add a letter-initial reserved word.
    ///
    /// Incomplete prefixes accept as identifiers; the complete word gets
    /// letter and digit edges back into the identifier state so that a
    /// longer word is a plain identifier.
    pub fn reserved_word(&mut self, spelling: &str, kind: TokenKind) -> &mut Self {
        let path = self.trie_path(spelling);
        if let Some((&last, prefix)) = path.split_last() {
            for &state in prefix {
                self.accepting.entry(state).or_insert(TokenKind::Identifier);
                self.reserved_prefix.insert(state);
            }
            self.accepting.insert(last, kind);
            self.reserved_prefix.insert(last);
            self.reserved_final.insert(last);
            self.edge(last, State::IDENT, Category::Letter);
            self.edge(last, State::IDENT, Category::Digit);
        }
        self
    }

    /// Add a symbol-initial reserved spelling (operators, type keywords).
    /// Incomplete prefixes are not accepting.
    pub fn reserved_symbol(&mut self, spelling: &str, kind: TokenKind) -> &mut Self {
        let path = self.trie_path(spelling);
        if let Some(&last) = path.last() {
            self.reserved_prefix.extend(path.iter().copied());
            self.reserved_final.insert(last);
            self.accept(last, kind);
        }
        self
    }

    /// Add a single-character token.
    pub fn punctuation(&mut self, c: char, kind: TokenKind) -> &mut Self {
        let path = self.trie_path(&c.to_string());
        if let Some(&state) = path.last() {
            self.accept(state, kind);
        }
        self
    }

    /// Freeze the table.
    pub fn build(self) -> Automaton {
        let triples = self
            .transitions
            .into_iter()
            .map(|((from, category), to)| (from, to, category));
        Automaton::new(triples, self.accepting)
            .with_reserved(self.reserved_prefix, self.reserved_final)
    }
}

static FISH_AUTOMATON: Lazy<Automaton> = Lazy::new(build_fish_automaton);

/// The shared, read-only automaton for the Fish language.
pub fn fish_automaton() -> &'static Automaton {
    &FISH_AUTOMATON
}

fn build_fish_automaton() -> Automaton {
    let mut builder = AutomatonBuilder::new();

    // Identifiers
    builder
        .edge(State::START, State::IDENT, Category::Letter)
        .edge(State::IDENT, State::IDENT, Category::Letter)
        .edge(State::IDENT, State::IDENT, Category::Digit)
        .accept(State::IDENT, TokenKind::Identifier);

    // Numerals: digits, optionally followed by `.` and digits
    builder
        .edge(State::START, State::NUMBER, Category::Digit)
        .edge(State::NUMBER, State::NUMBER, Category::Digit)
        .edge(State::NUMBER, State::NUMBER_DOT, Category::Exact('.'))
        .edge(State::NUMBER_DOT, State::FLOAT, Category::Digit)
        .edge(State::FLOAT, State::FLOAT, Category::Digit)
        .accept(State::NUMBER, TokenKind::Number)
        .accept(State::FLOAT, TokenKind::Number);

    // String literals
    builder
        .edge(State::START, State::STRING_BODY, Category::Exact('"'))
        .edge(State::STRING_BODY, State::STRING_BODY, Category::LiteralBody)
        .edge(State::STRING_BODY, State::STRING_ESCAPE, Category::Exact('\\'))
        .edge(State::STRING_ESCAPE, State::STRING_BODY, Category::LiteralBody)
        .edge(State::STRING_BODY, State::STRING_END, Category::Exact('"'))
        .accept(State::STRING_END, TokenKind::String);

    // Character literals: exactly one plain or escaped character
    builder
        .edge(State::START, State::CHAR_OPEN, Category::Exact('\''))
        .edge(State::CHAR_OPEN, State::CHAR_BODY, Category::LiteralBody)
        .edge(State::CHAR_OPEN, State::CHAR_ESCAPE, Category::Exact('\\'))
        .edge(State::CHAR_ESCAPE, State::CHAR_BODY, Category::LiteralBody)
        .edge(State::CHAR_BODY, State::CHAR_END, Category::Exact('\''))
        .accept(State::CHAR_END, TokenKind::Char);

    for &(spelling, kind) in WORD_KEYWORDS {
        builder.reserved_word(spelling, kind);
    }
    for &(spelling, kind) in ANGLE_KEYWORDS {
        builder.reserved_symbol(spelling, kind);
    }
    for &(c, kind) in PUNCTUATION {
        builder.punctuation(c, kind);
    }

    let automaton = builder.build();
    debug!(
        "Built Fish automaton with {} transitions",
        automaton.transition_count()
    );
    automaton
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Type;

    fn run(spelling: &str) -> Option<State> {
        let dfa = fish_automaton();
        spelling.chars().try_fold(State::START, |state, c| {
            let category = if c.is_ascii_digit() {
                Category::Digit
            } else if dfa.has_edge(state, Category::Exact(c)) {
                Category::Exact(c)
            } else if c.is_alphabetic() {
                Category::Letter
            } else {
                Category::Exact(c)
            };
            dfa.step(state, category)
        })
    }

    #[test]
    fn test_reserved_spellings_accept() {
        let dfa = fish_automaton();
        for &(spelling, kind) in WORD_KEYWORDS.iter().chain(ANGLE_KEYWORDS) {
            let state = run(spelling).expect("spelling should be accepted");
            assert_eq!(dfa.classify(state), Some(kind), "{}", spelling);
            assert!(dfa.is_reserved_final(state));
        }
    }

    #[test]
    fn test_prefix_states() {
        let dfa = fish_automaton();
        let fis = run("fis").unwrap();
        assert!(dfa.is_reserved_prefix(fis));
        assert!(!dfa.is_reserved_final(fis));
        assert_eq!(dfa.classify(fis), Some(TokenKind::Identifier));

        // `fish` is both final and a prefix of `fishtion`
        let fish = run("fish").unwrap();
        assert!(dfa.is_reserved_prefix(fish) && dfa.is_reserved_final(fish));

        let angle = run("<in").unwrap();
        assert!(!dfa.is_accepting(angle));
        assert_eq!(dfa.classify(run("<int").unwrap()), Some(TokenKind::Type(Type::Int)));
    }

    #[test]
    fn test_final_word_continues_as_identifier() {
        let dfa = fish_automaton();
        assert_eq!(run("fisher"), Some(State::IDENT));
        assert_eq!(run("if2"), Some(State::IDENT));
        assert_eq!(dfa.classify(State::IDENT), Some(TokenKind::Identifier));
    }

    #[test]
    fn test_numerals() {
        let dfa = fish_automaton();
        assert_eq!(dfa.classify(run("42").unwrap()), Some(TokenKind::Number));
        assert_eq!(dfa.classify(run("4.25").unwrap()), Some(TokenKind::Number));
        assert!(!dfa.is_accepting(run("4.").unwrap()));
    }

    #[test]
    fn test_missing_transition() {
        let dfa = fish_automaton();
        assert_eq!(dfa.step(State::START, Category::Exact('@')), None);
        assert_eq!(dfa.step(State::STRING_END, Category::LiteralBody), None);
    }
}
