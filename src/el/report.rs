//! Result reports for parse and write operations
//!
//! Parse and write calls never fail with `Err` across the public boundary;
//! they return one of these reports instead. Callers inspect the `success`
//! flag, the error message and the warning list. Every call produces its own
//! report; no operation retains a last-result snapshot.

use super::model::ExclusionType;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Outcome of a parse call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    /// Whether parsing ran to completion
    pub success: bool,
    /// Fatal error description when `success` is false
    pub error_message: Option<String>,
    /// Number of input lines seen, including blanks and comments
    pub lines_processed: usize,
    /// Number of exclusion records recognized
    pub exclusions_parsed: usize,
    /// Recognized records per category
    pub exclusion_counts: HashMap<ExclusionType, usize>,
    /// Non-fatal diagnostics, each carrying a 1-based line number
    pub warnings: Vec<String>,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Count one recognized exclusion record.
    pub fn record_exclusion(&mut self, exclusion_type: ExclusionType) {
        self.exclusions_parsed += 1;
        *self.exclusion_counts.entry(exclusion_type).or_insert(0) += 1;
    }

    /// Human-readable multi-line summary of the outcome.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Parse Result: {}",
            if self.success { "SUCCESS" } else { "FAILED" }
        );
        let _ = writeln!(out, "Lines processed: {}", self.lines_processed);
        let _ = writeln!(out, "Exclusions parsed: {}", self.exclusions_parsed);
        if !self.warnings.is_empty() {
            let _ = writeln!(out, "Warnings ({}):", self.warnings.len());
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {}", warning);
            }
        }
        if !self.success {
            if let Some(message) = &self.error_message {
                let _ = writeln!(out, "Error: {}", message);
            }
        }
        out
    }
}

/// Outcome of a write call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    /// Whether writing ran to completion
    pub success: bool,
    /// Fatal error description when `success` is false
    pub error_message: Option<String>,
    /// Number of output lines emitted
    pub lines_written: usize,
    /// Number of exclusion records emitted
    pub exclusions_written: usize,
    /// Number of scopes emitted
    pub scopes_written: usize,
    /// Emitted records per category
    pub exclusion_counts: HashMap<ExclusionType, usize>,
    /// Non-fatal diagnostics
    pub warnings: Vec<String>,
}

impl WriteResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Failure report with a message and nothing written.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Human-readable multi-line summary of the outcome.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Write Result: {}",
            if self.success { "SUCCESS" } else { "FAILED" }
        );
        let _ = writeln!(out, "Lines written: {}", self.lines_written);
        let _ = writeln!(out, "Exclusions written: {}", self.exclusions_written);
        let _ = writeln!(out, "Scopes written: {}", self.scopes_written);
        if !self.warnings.is_empty() {
            let _ = writeln!(out, "Warnings ({}):", self.warnings.len());
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {}", warning);
            }
        }
        if !self.success {
            if let Some(message) = &self.error_message {
                let _ = writeln!(out, "Error: {}", message);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_success() {
        let mut result = ParseResult::default();
        result.success = true;
        result.lines_processed = 10;
        result.record_exclusion(ExclusionType::Block);
        let summary = result.summary();
        assert!(summary.contains("Parse Result: SUCCESS"));
        assert!(summary.contains("Lines processed: 10"));
        assert!(summary.contains("Exclusions parsed: 1"));
    }

    #[test]
    fn test_parse_summary_failure_lists_error_and_warnings() {
        let mut result = ParseResult::default();
        result.error_message = Some("Line 3: bad input".to_string());
        result.warnings.push("something odd".to_string());
        let summary = result.summary();
        assert!(summary.contains("Parse Result: FAILED"));
        assert!(summary.contains("Warnings (1):"));
        assert!(summary.contains("  - something odd"));
        assert!(summary.contains("Error: Line 3: bad input"));
    }

    #[test]
    fn test_record_exclusion_counts() {
        let mut result = ParseResult::default();
        result.record_exclusion(ExclusionType::Toggle);
        result.record_exclusion(ExclusionType::Toggle);
        result.record_exclusion(ExclusionType::Fsm);
        assert_eq!(result.exclusions_parsed, 3);
        assert_eq!(result.exclusion_counts[&ExclusionType::Toggle], 2);
        assert_eq!(result.exclusion_counts[&ExclusionType::Fsm], 1);
    }

    #[test]
    fn test_write_failure() {
        let result = WriteResult::failure("Cannot create file: out.el");
        assert!(!result.is_success());
        assert!(result.summary().contains("Error: Cannot create file: out.el"));
    }
}
