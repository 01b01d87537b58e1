//! Text-to-text cleanup run before lexing.
//!
//! Block comments `<~ ... ~>` are removed non-greedily; an unterminated block
//! swallows the rest of the input. Line comments `~~` run to the end of the
//! line (the newline itself is kept). The pass is not literal-aware: a `~~`
//! inside a string literal still starts a comment.

use crate::WhitespaceMode;

/// Remove comments, then apply the whitespace policy.
pub fn preprocess(text: &str, mode: WhitespaceMode) -> String {
    let without_comments = remove_comments(text, mode);
    match mode {
        WhitespaceMode::Strip => without_comments.chars().filter(|c| !c.is_whitespace()).collect(),
        WhitespaceMode::Preserve => normalize_line_endings(&without_comments),
    }
}

/// Remove block and line comments.
///
/// In `Preserve` mode the newlines inside a removed block comment are kept so
/// that later line numbers still match the source file.
pub fn remove_comments(text: &str, mode: WhitespaceMode) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('<', Some('~')) => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if inner == '\n' && mode == WhitespaceMode::Preserve {
                        out.push('\n');
                    }
                    if prev == '~' && inner == '>' {
                        break;
                    }
                    prev = inner;
                }
            }
            ('~', Some('~')) => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
