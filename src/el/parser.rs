//! Stateful line parser for the `.el` format
//!
//! The parser makes a single pass over the input lines. Each trimmed,
//! non-comment line is classified by the ordered recognizer table in
//! [`crate::el::grammar`] and handed to the matching handler. Three pieces
//! of transient session state drive the grammar:
//!
//! - the *current scope* set by the last `MODULE:`/`INSTANCE:` line; an
//!   exclusion record can only attach to a scope already declared, and a
//!   record arriving with no current scope is dropped with a warning
//! - the *pending checksum* set by a `CHECKSUM:` line; it is attached to the
//!   next scope created and replaced only by the next `CHECKSUM:` line
//! - the *pending annotation* set by an `ANNOTATION:` line; it applies to
//!   exactly the next exclusion record attached and is cleared on use
//!
//! Session state is reset at the start of every parse call, and every call
//! returns its own [`ParseResult`] — the parser keeps no last-result
//! snapshot.

use super::config::ParserConfig;
use super::grammar::{self, LineKind};
use super::manager::ExclusionDataManager;
use super::model::{
    BlockExclusion, ConditionExclusion, ExclusionData, ExclusionType, FsmExclusion,
    ToggleDirection, ToggleExclusion,
};
use super::report::ParseResult;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Header markers looked for by the quick [`ExclusionParser::validate_file`]
/// sniff.
const HEADER_MARKERS: [&str; 2] = ["This file contains the Excluded objects", "Format Version:"];

/// Number of leading lines inspected by `validate_file`.
const HEADER_SNIFF_LINES: usize = 20;

#[derive(Debug, Clone)]
struct ScopeContext {
    name: String,
    is_module: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    current_scope: Option<ScopeContext>,
    pending_checksum: Option<String>,
    pending_annotation: Option<String>,
    line_number: usize,
}

/// Parser for `.el` exclusion list files.
///
/// The parser exclusively owns the [`ExclusionData`] it populates; callers
/// take the database out by value with [`take_data`](Self::take_data) or
/// hand the whole parser off with
/// [`into_data_manager`](Self::into_data_manager).
#[derive(Debug, Default)]
pub struct ExclusionParser {
    config: ParserConfig,
    data: ExclusionData,
    state: SessionState,
}

impl ExclusionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Parse one file into the database.
    ///
    /// Fails fast — with a failure report, never a panic or `Err` — if the
    /// file is missing, unreadable, or larger than the configured maximum.
    /// Unless `merge_on_load` is set, the database is replaced by a fresh
    /// one for this file.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> ParseResult {
        let path = path.as_ref();
        debug!(file = %path.display(), "parsing exclusion file");
        self.reset_state();

        let mut result = ParseResult::default();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => {
                result.error_message = Some(format!("File does not exist: {}", path.display()));
                return result;
            }
        };
        if metadata.len() > self.config.max_file_size {
            result.error_message = Some(format!(
                "File too large: {} bytes (max: {})",
                metadata.len(),
                self.config.max_file_size
            ));
            return result;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                result.error_message =
                    Some(format!("Cannot open file: {}: {}", path.display(), err));
                return result;
            }
        };

        let file_name = path.display().to_string();
        if self.config.merge_on_load {
            self.data.file_name = file_name;
        } else {
            self.data = ExclusionData::new(file_name);
        }

        self.parse_lines(&content)
    }

    /// Parse several files, aggregating the per-file reports.
    ///
    /// With `continue_on_error` a failing file becomes a warning and parsing
    /// moves on; otherwise the first failure aborts the whole call. Note
    /// that each file goes through [`parse_file`](Self::parse_file), so
    /// accumulating records across files requires `merge_on_load`.
    pub fn parse_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        continue_on_error: bool,
    ) -> ParseResult {
        debug!(count = paths.len(), "parsing exclusion files");
        let mut combined = ParseResult::default();

        for path in paths {
            let result = self.parse_file(path);
            combined.lines_processed += result.lines_processed;
            combined.exclusions_parsed += result.exclusions_parsed;
            for (exclusion_type, count) in &result.exclusion_counts {
                *combined.exclusion_counts.entry(*exclusion_type).or_insert(0) += count;
            }
            combined.warnings.extend(result.warnings.iter().cloned());

            if !result.success {
                let message = format!(
                    "Failed to parse {}: {}",
                    path.as_ref().display(),
                    result.error_message.as_deref().unwrap_or("unknown error")
                );
                if !continue_on_error {
                    combined.error_message = Some(message);
                    return combined;
                }
                combined.warnings.push(message);
            }
        }

        combined.success = true;
        combined
    }

    /// Parse string content into the database. `source_id` only labels
    /// diagnostics; the database is accumulated into, never replaced.
    pub fn parse_str(&mut self, content: &str, source_id: &str) -> ParseResult {
        debug!(source = source_id, "parsing exclusion content");
        self.reset_state();
        self.parse_lines(content)
    }

    /// Quick header sniff: does the first stretch of the file look like an
    /// exclusion list? Not a full parse.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> bool {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return false,
        };
        content
            .lines()
            .take(HEADER_SNIFF_LINES)
            .map(str::trim)
            .any(|line| HEADER_MARKERS.iter().any(|marker| line.contains(marker)))
    }

    pub fn data(&self) -> &ExclusionData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ExclusionData {
        &mut self.data
    }

    pub fn set_data(&mut self, data: ExclusionData) {
        self.data = data;
    }

    /// Take the database out of the parser, leaving an empty one behind.
    pub fn take_data(&mut self) -> ExclusionData {
        std::mem::take(&mut self.data)
    }

    pub fn has_data(&self) -> bool {
        !self.data.scopes.is_empty()
    }

    /// Drop all parsed data and session state.
    pub fn clear(&mut self) {
        self.data.clear();
        self.reset_state();
    }

    /// Hand the parsed database to a data manager, consuming the parser.
    pub fn into_data_manager(self) -> ExclusionDataManager {
        ExclusionDataManager::with_data(self.data)
    }

    fn reset_state(&mut self) {
        self.state = SessionState::default();
    }

    fn parse_lines(&mut self, content: &str) -> ParseResult {
        let mut result = ParseResult::default();

        for raw_line in content.lines() {
            self.state.line_number += 1;
            result.lines_processed += 1;

            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if grammar::is_comment(line) {
                if self.config.preserve_comments {
                    // Header fields travel in comment syntax; scan before skipping
                    self.handle_header(line);
                }
                continue;
            }

            let consumed = match grammar::classify_line(line) {
                Some(LineKind::Header) => self.handle_header(line),
                Some(LineKind::Checksum) => self.handle_checksum(line, &mut result),
                Some(LineKind::Scope) => self.handle_scope(line),
                Some(LineKind::Annotation) => self.handle_annotation(line),
                Some(LineKind::Block) => self.handle_block(line, &mut result),
                Some(LineKind::Toggle) => self.handle_toggle(line, &mut result),
                Some(LineKind::Fsm) => self.handle_fsm(line, &mut result),
                Some(LineKind::Condition) => self.handle_condition(line, &mut result),
                Some(LineKind::Transition) => self.handle_transition(line, &mut result),
                None => false,
            };

            if !consumed {
                let warning = format!(
                    "Unrecognized line format at line {}: {}",
                    self.state.line_number, line
                );
                warn!(line = self.state.line_number, "unrecognized line");
                result.warnings.push(warning);

                if self.config.strict_mode {
                    result.error_message = Some(format!(
                        "Line {}: Unrecognized line format: {}",
                        self.state.line_number, line
                    ));
                    return result;
                }
            }
        }

        result.success = true;
        debug!(
            exclusions = result.exclusions_parsed,
            warnings = result.warnings.len(),
            "parse complete"
        );
        result
    }

    /// Header fields are matched by containment; the value is the trimmed
    /// text after the line's first `:`. Last occurrence wins.
    fn handle_header(&mut self, line: &str) -> bool {
        let field = if line.contains("Generated By User:") {
            &mut self.data.generated_by
        } else if line.contains("Format Version:") {
            &mut self.data.format_version
        } else if line.contains("Date:") {
            &mut self.data.generation_date
        } else if line.contains("ExclMode:") {
            &mut self.data.exclusion_mode
        } else {
            return false;
        };

        if let Some(idx) = line.find(':') {
            let value = line[idx + 1..].trim();
            if !value.is_empty() {
                *field = Some(value.to_string());
            }
        }
        true
    }

    fn handle_checksum(&mut self, line: &str, result: &mut ParseResult) -> bool {
        if let Some(rest) = line.strip_prefix("CHECKSUM:") {
            let value = grammar::strip_surrounding_quotes(rest.trim());
            if !value.is_empty() {
                if self.config.validate_checksums && !grammar::is_valid_checksum(value) {
                    result
                        .warnings
                        .push(format!("Invalid checksum format: {}", value));
                }
                self.state.pending_checksum = Some(value.to_string());
            }
        }
        true
    }

    fn handle_scope(&mut self, line: &str) -> bool {
        let (rest, is_module) = if let Some(rest) = line.strip_prefix("MODULE:") {
            (rest, true)
        } else if let Some(rest) = line.strip_prefix("INSTANCE:") {
            (rest, false)
        } else {
            return false;
        };

        let name = rest.trim();
        if name.is_empty() {
            self.state.current_scope = None;
            return true;
        }

        self.state.current_scope = Some(ScopeContext {
            name: name.to_string(),
            is_module,
        });
        self.data
            .get_or_create_scope(name, self.state.pending_checksum.clone(), is_module);
        true
    }

    fn handle_annotation(&mut self, line: &str) -> bool {
        if line.starts_with("ANNOTATION_END") {
            // Multi-line annotations are tolerated but not modeled; the end
            // marker is discarded without effect
            return true;
        }
        if let Some(idx) = line.find(':') {
            let value =
                grammar::unescape_quotes(grammar::strip_surrounding_quotes(line[idx + 1..].trim()));
            self.state.pending_annotation = if value.is_empty() { None } else { Some(value) };
        }
        true
    }

    fn handle_block(&mut self, line: &str, result: &mut ParseResult) -> bool {
        let rest = line.strip_prefix("Block ").unwrap_or(line);
        let (id, rest) = grammar::split_first_word(rest);
        let (checksum, next) = grammar::extract_quoted(rest, 0);
        let (source_code, _) = grammar::extract_quoted(rest, next);

        result.record_exclusion(ExclusionType::Block);
        let mut block = BlockExclusion::new(id, checksum, source_code);
        self.attach(ExclusionType::Block, result, |scope, annotation| {
            block.annotation = annotation;
            scope.add_block(block);
        });
        true
    }

    fn handle_toggle(&mut self, line: &str, result: &mut ParseResult) -> bool {
        let rest = line.strip_prefix("Toggle ").unwrap_or(line).trim();

        // A leading direction token is optional; anything else is already
        // the signal name
        let (first_word, after_first) = grammar::split_first_word(rest);
        let direction = ToggleDirection::from_token(first_word);
        let rest = if direction == ToggleDirection::Both {
            rest
        } else {
            after_first.trim_start()
        };

        // Signal name runs up to the first space or '['
        let end = rest
            .find(|c: char| c == ' ' || c == '[')
            .unwrap_or(rest.len());
        let signal_name = &rest[..end];
        let mut rest = &rest[end..];

        // Optional bit index, with or without a space before the bracket
        let mut bit_index = None;
        let after_signal = rest.trim_start();
        if let Some(bracketed) = after_signal.strip_prefix('[') {
            if let Some(close) = bracketed.find(']') {
                bit_index = bracketed[..close].trim().parse::<i32>().ok();
                rest = &bracketed[close + 1..];
            }
        }

        let (net_description, _) = grammar::extract_quoted(rest, 0);

        result.record_exclusion(ExclusionType::Toggle);
        let mut toggle = ToggleExclusion::new(direction, signal_name, net_description);
        toggle.bit_index = bit_index;
        self.attach(ExclusionType::Toggle, result, |scope, annotation| {
            toggle.annotation = annotation;
            scope.add_toggle(toggle);
        });
        true
    }

    fn handle_fsm(&mut self, line: &str, result: &mut ParseResult) -> bool {
        let rest = line.strip_prefix("Fsm ").unwrap_or(line);
        let (fsm_name, rest) = grammar::split_first_word(rest);
        let (checksum, _) = grammar::extract_quoted(rest, 0);

        result.record_exclusion(ExclusionType::Fsm);
        let mut fsm = FsmExclusion::state(fsm_name, checksum);
        self.attach(ExclusionType::Fsm, result, |scope, annotation| {
            fsm.annotation = annotation;
            scope.add_fsm(fsm);
        });
        true
    }

    fn handle_condition(&mut self, line: &str, result: &mut ParseResult) -> bool {
        let rest = line.strip_prefix("Condition ").unwrap_or(line);
        let (condition_id, rest) = grammar::split_first_word(rest);
        let (checksum, next) = grammar::extract_quoted(rest, 0);
        let (quoted, next) = grammar::extract_quoted(rest, next);

        // The quoted field splits on its last space into expression and
        // parameters; no space means no parameters
        let (expression, parameters) = match quoted.rfind(' ') {
            Some(idx) => (quoted[..idx].to_string(), quoted[idx + 1..].to_string()),
            None => (quoted, String::new()),
        };

        let remaining = rest[next..].trim();
        let coverage =
            if remaining.len() >= 2 && remaining.starts_with('(') && remaining.ends_with(')') {
                remaining[1..remaining.len() - 1].to_string()
            } else {
                String::new()
            };

        result.record_exclusion(ExclusionType::Condition);
        let mut condition = ConditionExclusion::new(condition_id, checksum, expression)
            .with_parameters(parameters)
            .with_coverage(coverage);
        self.attach(ExclusionType::Condition, result, |scope, annotation| {
            condition.annotation = annotation;
            scope.add_condition(condition);
        });
        true
    }

    /// Transition lines missing the arrow or the separator space are not
    /// recognized and fall through to the unrecognized-line path.
    fn handle_transition(&mut self, line: &str, result: &mut ParseResult) -> bool {
        let rest = line.strip_prefix("Transition ").unwrap_or(line);
        let Some(arrow) = rest.find("->") else {
            return false;
        };
        let from_state = rest[..arrow].trim().to_string();
        let Some(space) = rest[arrow..].find(' ').map(|idx| arrow + idx) else {
            return false;
        };
        let to_state = rest[arrow + 2..space].trim().to_string();
        let (transition_id, _) = grammar::extract_quoted(rest, space);

        result.record_exclusion(ExclusionType::Fsm);
        let mut fsm = FsmExclusion::transition("transition", from_state, to_state, transition_id);
        self.attach(ExclusionType::Fsm, result, |scope, annotation| {
            fsm.annotation = annotation;
            scope.add_fsm(fsm);
        });
        true
    }

    /// Attach a record to the current scope, consuming the pending
    /// annotation. With no current scope the record is dropped and a warning
    /// recorded; the pending annotation stays set for the next record.
    fn attach<F>(&mut self, exclusion_type: ExclusionType, result: &mut ParseResult, store: F)
    where
        F: FnOnce(&mut super::model::ExclusionScope, Option<String>),
    {
        match self.state.current_scope.clone() {
            Some(context) => {
                let annotation = self.state.pending_annotation.take();
                let scope = self.data.get_or_create_scope(
                    &context.name,
                    self.state.pending_checksum.clone(),
                    context.is_module,
                );
                store(scope, annotation);
            }
            None => {
                warn!(
                    line = self.state.line_number,
                    kind = exclusion_type.label(),
                    "exclusion outside of any scope dropped"
                );
                result.warnings.push(format!(
                    "Line {}: {} exclusion outside of any scope was dropped",
                    self.state.line_number,
                    exclusion_type.label()
                ));
            }
        }
    }
}
