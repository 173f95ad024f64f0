//! Glob-style pattern matching for scope names
//!
//! Converts a wildcard pattern into a fully anchored regex match against a
//! candidate string: `*` matches any run of characters, `?` matches exactly
//! one character, and every other regex metacharacter in the pattern is
//! treated as a literal.

use regex::Regex;
use std::fmt;

/// Error type for glob pattern compilation
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    /// The translated pattern failed to compile
    InvalidPattern(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidPattern(msg) => write!(f, "Invalid glob pattern: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {}

/// A compiled glob pattern.
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern. The match is anchored at both ends.
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        let regex = Regex::new(&Self::translate(pattern, case_sensitive))
            .map_err(|e| PatternError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Translate glob syntax into an anchored regex pattern.
    fn translate(pattern: &str, case_sensitive: bool) -> String {
        let mut translated = String::with_capacity(pattern.len() + 8);
        if !case_sensitive {
            translated.push_str("(?i)");
        }
        translated.push('^');
        for c in pattern.chars() {
            match c {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                c => translated.push_str(&regex::escape(&c.to_string())),
            }
        }
        translated.push('$');
        translated
    }

    /// Match the whole candidate string against the pattern.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Get the original glob pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Convenience one-shot match. Returns `false` for a pattern that fails to
/// compile.
pub fn matches(pattern: &str, candidate: &str, case_sensitive: bool) -> bool {
    GlobPattern::new(pattern, case_sensitive)
        .map(|glob| glob.is_match(candidate))
        .unwrap_or(false)
}
