//! Line grammar for the `.el` format
//!
//! The format is line-oriented: every logical record fits on one trimmed
//! line. This module owns the lexical layer shared by the parser and the
//! writer — the ordered recognizer table that classifies a line, comment
//! detection, and quoted-field extraction/escaping.
//!
//! Classification follows a fixed priority order (important for
//! correctness):
//! 1. Header fields (`Generated By User:`, `Format Version:`, `Date:`,
//!    `ExclMode:`), matched anywhere in the line
//! 2. `CHECKSUM:` lines
//! 3. `MODULE:` / `INSTANCE:` scope declarations
//! 4. `ANNOTATION:` / `ANNOTATION_BEGIN:` / `ANNOTATION_END` lines
//! 5. `Block` records
//! 6. `Toggle` records
//! 7. `Fsm` records
//! 8. `Condition` records
//! 9. `Transition` records
//!
//! The patterns are grammar data, not code: they live in one ordered table
//! so the priority is explicit and testable in isolation.

use once_cell::sync::Lazy;
use regex::Regex;

/// The kind of line recognized by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// One of the four file header fields
    Header,
    /// `CHECKSUM: "<value>"`
    Checksum,
    /// `MODULE:<name>` or `INSTANCE:<name>`
    Scope,
    /// `ANNOTATION:`, `ANNOTATION_BEGIN:` or `ANNOTATION_END`
    Annotation,
    /// `Block <id> "<checksum>" "<sourceCode>"`
    Block,
    /// `Toggle [<dir>] <signal>[ [<bit>]] "<net>"`
    Toggle,
    /// `Fsm <name> "<checksum>"`
    Fsm,
    /// `Condition <id> "<checksum>" "<expr> <params>"[ (<coverage>)]`
    Condition,
    /// `Transition <from>-><to> "<transitionId>"`
    Transition,
}

/// Recognizer patterns in priority order. The first matching pattern
/// consumes the line; order matters for correct disambiguation.
const LINE_PATTERNS: &[(LineKind, &str)] = &[
    (
        LineKind::Header,
        r"Generated By User:|Format Version:|Date:|ExclMode:",
    ),
    (LineKind::Checksum, r"^CHECKSUM:"),
    (LineKind::Scope, r"^(MODULE|INSTANCE):"),
    (LineKind::Annotation, r"^ANNOTATION(:|_BEGIN:|_END)"),
    (LineKind::Block, r"^Block "),
    (LineKind::Toggle, r"^Toggle "),
    (LineKind::Fsm, r"^Fsm "),
    (LineKind::Condition, r"^Condition "),
    (LineKind::Transition, r"^Transition "),
];

static COMPILED_PATTERNS: Lazy<Vec<(LineKind, Regex)>> = Lazy::new(|| {
    LINE_PATTERNS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("valid line pattern")))
        .collect()
});

/// Classify a trimmed, non-comment line. Returns `None` for a line no
/// recognizer claims.
pub fn classify_line(line: &str) -> Option<LineKind> {
    COMPILED_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(line))
        .map(|(kind, _)| *kind)
}

/// A comment line: `//` prefix or a banner run of `=` characters.
pub fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with("====")
}

/// Extract the next quoted field at or after `start`.
///
/// Scans forward for the opening `"`, then for the next unescaped `"`.
/// Returns the unescaped field contents and the byte offset just past the
/// closing quote. A missing quote pair degrades to an empty string with the
/// offset at the end of the line.
pub fn extract_quoted(line: &str, start: usize) -> (String, usize) {
    let bytes = line.as_bytes();
    let mut open = start.min(bytes.len());
    while open < bytes.len() && bytes[open] != b'"' {
        open += 1;
    }
    if open >= bytes.len() {
        return (String::new(), line.len());
    }
    let mut close = open + 1;
    while close < bytes.len() {
        if bytes[close] == b'"' && bytes[close - 1] != b'\\' {
            break;
        }
        close += 1;
    }
    if close >= bytes.len() {
        return (String::new(), line.len());
    }
    (unescape_quotes(&line[open + 1..close]), close + 1)
}

/// Split off the first whitespace-delimited word; returns the word and the
/// remainder (which may carry leading whitespace).
pub fn split_first_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], &input[idx..]),
        None => (input, ""),
    }
}

/// Strip one pair of surrounding double quotes, if both are present.
pub fn strip_surrounding_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Escape double quotes for embedding in a quoted field.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Reverse [`escape_quotes`]; the only escape sequence the grammar knows.
pub fn unescape_quotes(value: &str) -> String {
    value.replace("\\\"", "\"")
}

/// A well-formed checksum value contains only digits and spaces.
pub fn is_valid_checksum(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == ' ')
}
