//! Deterministic serializer for the `.el` format
//!
//! The writer renders an [`ExclusionData`] back to the line grammar the
//! parser reads. Output order is deterministic: the optional comment header
//! first, then each scope (sorted lexicographically when `sort_exclusions`
//! is set, else insertion order), and within each scope the Block, Toggle,
//! FSM and Condition categories in that fixed order. Double quotes inside
//! written values are escaped; the parser unescapes symmetrically, so
//! repeated round trips are stable.
//!
//! Write calls return a [`WriteResult`] report — I/O failures mid-stream are
//! caught at the top of the call and converted to a failure report, never a
//! panic or an `Err` across the public boundary.

use super::config::WriterConfig;
use super::grammar;
use super::model::{
    BlockExclusion, ConditionExclusion, ExclusionData, ExclusionScope, ExclusionType,
    FsmExclusion, FsmExclusionKind, ToggleExclusion,
};
use super::report::WriteResult;
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

const HEADER_BANNER: &str = "//==================================================";
const HEADER_TITLE: &str = "// This file contains the Excluded objects";
const DEFAULT_GENERATED_BY: &str = "ExclusionCoverageParser";
const DEFAULT_FORMAT_VERSION: &str = "2";
const DEFAULT_EXCL_MODE: &str = "default";

/// Writer for `.el` exclusion list files.
#[derive(Debug, Default)]
pub struct ExclusionWriter {
    config: WriterConfig,
}

impl ExclusionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WriterConfig) {
        self.config = config;
    }

    /// Write the whole database to a file.
    pub fn write_file(&self, path: impl AsRef<Path>, data: &ExclusionData) -> WriteResult {
        let path = path.as_ref();
        debug!(file = %path.display(), "writing exclusion file");
        let file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                return WriteResult::failure(format!(
                    "Cannot create file: {}: {}",
                    path.display(),
                    err
                ));
            }
        };
        let mut writer = BufWriter::new(file);
        let mut result = self.write_to_stream(&mut writer, data);
        if result.success {
            if let Err(err) = writer.flush() {
                result.success = false;
                result.error_message =
                    Some(format!("Cannot write file: {}: {}", path.display(), err));
            }
        }
        result
    }

    /// Serialize the whole database to a string.
    pub fn write_to_string(&self, data: &ExclusionData) -> String {
        let mut buffer = Vec::new();
        self.write_to_stream(&mut buffer, data);
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Write the whole database to a stream.
    pub fn write_to_stream<W: Write>(&self, out: &mut W, data: &ExclusionData) -> WriteResult {
        let mut result = WriteResult::default();
        match self.write_inner(out, data, &mut result) {
            Ok(()) => result.success = true,
            Err(err) => {
                result.success = false;
                result.error_message = Some(format!("Write error: {}", err));
            }
        }
        result
    }

    /// Write only the named scopes, in the order given.
    pub fn write_scopes(
        &self,
        path: impl AsRef<Path>,
        data: &ExclusionData,
        scope_names: &[String],
    ) -> WriteResult {
        let mut filtered = data.clone();
        filtered.scopes = IndexMap::new();
        for name in scope_names {
            if let Some(scope) = data.scopes.get(name) {
                filtered.scopes.insert(name.clone(), scope.clone());
            }
        }
        self.write_file(path, &filtered)
    }

    /// Write the database with only the selected exclusion categories kept.
    pub fn write_filtered_by_type(
        &self,
        path: impl AsRef<Path>,
        data: &ExclusionData,
        types: &[ExclusionType],
    ) -> WriteResult {
        let mut filtered = data.clone();
        for scope in filtered.scopes.values_mut() {
            if !types.contains(&ExclusionType::Block) {
                scope.block_exclusions.clear();
            }
            if !types.contains(&ExclusionType::Toggle) {
                scope.toggle_exclusions.clear();
            }
            if !types.contains(&ExclusionType::Fsm) {
                scope.fsm_exclusions.clear();
            }
            if !types.contains(&ExclusionType::Condition) {
                scope.condition_exclusions.clear();
            }
        }
        self.write_file(path, &filtered)
    }

    /// Append the database to an existing file, header suppressed.
    pub fn append_to_file(&self, path: impl AsRef<Path>, data: &ExclusionData) -> WriteResult {
        let path = path.as_ref();
        let file = match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => file,
            Err(err) => {
                return WriteResult::failure(format!(
                    "Cannot open file for appending: {}: {}",
                    path.display(),
                    err
                ));
            }
        };
        let appender = ExclusionWriter::with_config(WriterConfig {
            include_comments: false,
            ..self.config.clone()
        });
        let mut writer = BufWriter::new(file);
        let mut result = appender.write_to_stream(&mut writer, data);
        if result.success {
            if let Err(err) = writer.flush() {
                result.success = false;
                result.error_message =
                    Some(format!("Cannot write file: {}: {}", path.display(), err));
            }
        }
        result
    }

    /// Write each database to its own file, the base filename suffixed with
    /// `_<index>` before the extension. Stops at the first failing shard.
    pub fn write_multiple_files(
        &self,
        base_filename: &str,
        data_list: &[ExclusionData],
    ) -> WriteResult {
        let mut combined = WriteResult::default();

        for (index, data) in data_list.iter().enumerate() {
            let filename = match base_filename.rfind('.') {
                Some(dot) => format!(
                    "{}_{}{}",
                    &base_filename[..dot],
                    index,
                    &base_filename[dot..]
                ),
                None => format!("{}_{}", base_filename, index),
            };

            let result = self.write_file(&filename, data);
            combined.lines_written += result.lines_written;
            combined.exclusions_written += result.exclusions_written;
            combined.scopes_written += result.scopes_written;
            for (exclusion_type, count) in &result.exclusion_counts {
                *combined.exclusion_counts.entry(*exclusion_type).or_insert(0) += count;
            }
            combined.warnings.extend(result.warnings.iter().cloned());

            if !result.success {
                combined.success = false;
                combined.error_message = Some(format!(
                    "Failed to write {}: {}",
                    filename,
                    result.error_message.as_deref().unwrap_or("unknown error")
                ));
                return combined;
            }
        }

        combined.success = true;
        combined
    }

    /// Flag structural problems that would produce a degenerate file; the
    /// write itself is never blocked.
    pub fn validate_for_writing(&self, data: &ExclusionData) -> Vec<String> {
        let mut issues = Vec::new();

        for (scope_name, scope) in &data.scopes {
            if scope_name.is_empty() {
                issues.push("Scope with empty name found".to_string());
            }
            for block_id in scope.block_exclusions.keys() {
                if block_id.is_empty() {
                    issues.push(format!("Block exclusion with empty ID in scope: {}", scope_name));
                }
            }
            for signal_name in scope.toggle_exclusions.keys() {
                if signal_name.is_empty() {
                    issues.push(format!(
                        "Toggle exclusion with empty signal name in scope: {}",
                        scope_name
                    ));
                }
            }
            for fsm_name in scope.fsm_exclusions.keys() {
                if fsm_name.is_empty() {
                    issues.push(format!("FSM exclusion with empty name in scope: {}", scope_name));
                }
            }
            for condition_id in scope.condition_exclusions.keys() {
                if condition_id.is_empty() {
                    issues.push(format!(
                        "Condition exclusion with empty ID in scope: {}",
                        scope_name
                    ));
                }
            }
        }

        issues
    }

    /// Render the first `max_lines` lines of the serialized output, with a
    /// truncation marker when more would follow.
    pub fn preview(&self, data: &ExclusionData, max_lines: usize) -> String {
        let full = self.write_to_string(data);
        let mut lines = full.lines();
        let mut preview = String::new();
        let mut shown = 0;

        for line in lines.by_ref() {
            if shown >= max_lines {
                preview.push_str(&format!("... (truncated, {} lines shown)\n", shown));
                return preview;
            }
            preview.push_str(line);
            preview.push('\n');
            shown += 1;
        }

        preview
    }

    /// Rough byte estimate of the serialized output: fixed per-record
    /// overhead plus string lengths.
    pub fn estimate_output_size(&self, data: &ExclusionData) -> usize {
        let mut estimated = 0;

        if self.config.include_comments {
            estimated += 500;
        }

        for (scope_name, scope) in &data.scopes {
            estimated += 100 + scope_name.len();

            for (block_id, block) in &scope.block_exclusions {
                estimated += 50
                    + block_id.len()
                    + block.checksum.len()
                    + block.source_code.len()
                    + annotation_len(&block.annotation);
            }
            for (signal_name, toggles) in &scope.toggle_exclusions {
                for toggle in toggles {
                    estimated += 50
                        + signal_name.len()
                        + toggle.net_description.len()
                        + annotation_len(&toggle.annotation);
                }
            }
            for (fsm_name, fsms) in &scope.fsm_exclusions {
                for fsm in fsms {
                    estimated += 50 + fsm_name.len() + annotation_len(&fsm.annotation);
                    match &fsm.kind {
                        FsmExclusionKind::State { checksum } => estimated += checksum.len(),
                        FsmExclusionKind::Transition {
                            from_state,
                            to_state,
                            transition_id,
                        } => {
                            estimated += from_state.len() + to_state.len() + transition_id.len();
                        }
                    }
                }
            }
            for (condition_id, condition) in &scope.condition_exclusions {
                estimated += 100
                    + condition_id.len()
                    + condition.checksum.len()
                    + condition.expression.len()
                    + condition.parameters.len()
                    + condition.coverage.len()
                    + annotation_len(&condition.annotation);
            }
        }

        estimated
    }

    fn write_inner<W: Write>(
        &self,
        out: &mut W,
        data: &ExclusionData,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        if self.config.include_comments {
            self.write_header(out, data, result)?;
        }

        let mut scope_order: Vec<&String> = data.scopes.keys().collect();
        if self.config.sort_exclusions {
            scope_order.sort();
        }

        for scope_name in scope_order {
            let scope = &data.scopes[scope_name];
            self.write_scope(out, scope_name, scope, result)?;
            result.scopes_written += 1;
            result.exclusions_written += scope.total_exclusion_count();
            for (exclusion_type, count) in scope.counts_by_type() {
                *result.exclusion_counts.entry(exclusion_type).or_insert(0) += count;
            }
        }

        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        out: &mut W,
        data: &ExclusionData,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        self.write_line(out, HEADER_BANNER, result)?;
        self.write_line(out, HEADER_TITLE, result)?;
        self.write_line(
            out,
            &format!(
                "// Generated By User: {}",
                data.generated_by.as_deref().unwrap_or(DEFAULT_GENERATED_BY)
            ),
            result,
        )?;
        self.write_line(
            out,
            &format!(
                "// Format Version: {}",
                data.format_version
                    .as_deref()
                    .unwrap_or(DEFAULT_FORMAT_VERSION)
            ),
            result,
        )?;
        let date = match &data.generation_date {
            Some(date) => date.clone(),
            None => chrono::Local::now().format("%a %b %d %H:%M:%S %Y").to_string(),
        };
        self.write_line(out, &format!("// Date: {}", date), result)?;
        self.write_line(
            out,
            &format!(
                "// ExclMode: {}",
                data.exclusion_mode.as_deref().unwrap_or(DEFAULT_EXCL_MODE)
            ),
            result,
        )?;
        self.write_line(out, HEADER_BANNER, result)?;
        Ok(())
    }

    fn write_scope<W: Write>(
        &self,
        out: &mut W,
        scope_name: &str,
        scope: &ExclusionScope,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        match &scope.checksum {
            Some(checksum) if !checksum.is_empty() => {
                self.write_line(out, &format!("CHECKSUM: \"{}\"", checksum), result)?;
            }
            _ if self.config.generate_checksums => {
                let checksum = generate_scope_checksum(scope);
                self.write_line(out, &format!("CHECKSUM: \"{}\"", checksum), result)?;
            }
            _ => {}
        }

        let keyword = if scope.is_module { "MODULE:" } else { "INSTANCE:" };
        self.write_line(out, &format!("{}{}", keyword, scope_name), result)?;

        self.write_block_exclusions(out, scope, result)?;
        self.write_toggle_exclusions(out, scope, result)?;
        self.write_fsm_exclusions(out, scope, result)?;
        self.write_condition_exclusions(out, scope, result)?;
        Ok(())
    }

    fn write_block_exclusions<W: Write>(
        &self,
        out: &mut W,
        scope: &ExclusionScope,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        for block_id in self.ordered_keys(&scope.block_exclusions) {
            let block = &scope.block_exclusions[block_id];
            self.write_annotation(out, &block.annotation, result)?;
            self.write_line(out, &block_line(block), result)?;
        }
        Ok(())
    }

    fn write_toggle_exclusions<W: Write>(
        &self,
        out: &mut W,
        scope: &ExclusionScope,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        for signal_name in self.ordered_keys(&scope.toggle_exclusions) {
            for toggle in &scope.toggle_exclusions[signal_name] {
                self.write_annotation(out, &toggle.annotation, result)?;
                self.write_line(out, &toggle_line(toggle), result)?;
            }
        }
        Ok(())
    }

    fn write_fsm_exclusions<W: Write>(
        &self,
        out: &mut W,
        scope: &ExclusionScope,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        for fsm_name in self.ordered_keys(&scope.fsm_exclusions) {
            for fsm in &scope.fsm_exclusions[fsm_name] {
                self.write_annotation(out, &fsm.annotation, result)?;
                self.write_line(out, &fsm_line(fsm), result)?;
            }
        }
        Ok(())
    }

    fn write_condition_exclusions<W: Write>(
        &self,
        out: &mut W,
        scope: &ExclusionScope,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        for condition_id in self.ordered_keys(&scope.condition_exclusions) {
            let condition = &scope.condition_exclusions[condition_id];
            self.write_annotation(out, &condition.annotation, result)?;
            self.write_line(out, &condition_line(condition), result)?;
        }
        Ok(())
    }

    fn write_annotation<W: Write>(
        &self,
        out: &mut W,
        annotation: &Option<String>,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        if !self.config.include_annotations {
            return Ok(());
        }
        match annotation {
            Some(text) if !text.is_empty() => self.write_line(
                out,
                &format!("ANNOTATION: \"{}\"", grammar::escape_quotes(text)),
                result,
            ),
            _ => Ok(()),
        }
    }

    fn write_line<W: Write>(
        &self,
        out: &mut W,
        line: &str,
        result: &mut WriteResult,
    ) -> io::Result<()> {
        write!(out, "{}{}{}", self.config.indentation, line, self.config.line_ending)?;
        result.lines_written += 1;
        Ok(())
    }

    /// Category keys in output order: sorted under `sort_exclusions`, else
    /// insertion order.
    fn ordered_keys<'a, T>(&self, map: &'a IndexMap<String, T>) -> Vec<&'a String> {
        let mut keys: Vec<&String> = map.keys().collect();
        if self.config.sort_exclusions {
            keys.sort();
        }
        keys
    }
}

fn annotation_len(annotation: &Option<String>) -> usize {
    annotation.as_deref().map_or(0, str::len)
}

fn block_line(block: &BlockExclusion) -> String {
    format!(
        "Block {} \"{}\" \"{}\"",
        block.id,
        block.checksum,
        grammar::escape_quotes(&block.source_code)
    )
}

fn toggle_line(toggle: &ToggleExclusion) -> String {
    let mut line = String::from("Toggle ");
    let direction = toggle.direction.as_token();
    if !direction.is_empty() {
        line.push_str(direction);
        line.push(' ');
    }
    line.push_str(&toggle.signal_name);
    if let Some(bit_index) = toggle.bit_index {
        line.push_str(&format!(" [{}]", bit_index));
    }
    line.push_str(&format!(
        " \"{}\"",
        grammar::escape_quotes(&toggle.net_description)
    ));
    line
}

fn fsm_line(fsm: &FsmExclusion) -> String {
    match &fsm.kind {
        FsmExclusionKind::State { checksum } => {
            format!("Fsm {} \"{}\"", fsm.fsm_name, checksum)
        }
        FsmExclusionKind::Transition {
            from_state,
            to_state,
            transition_id,
        } => {
            format!("Transition {}->{} \"{}\"", from_state, to_state, transition_id)
        }
    }
}

fn condition_line(condition: &ConditionExclusion) -> String {
    let mut line = format!(
        "Condition {} \"{}\" \"{}",
        condition.condition_id,
        condition.checksum,
        grammar::escape_quotes(&condition.expression)
    );
    if !condition.parameters.is_empty() {
        line.push(' ');
        line.push_str(&condition.parameters);
    }
    line.push('"');
    if !condition.coverage.is_empty() {
        line.push_str(&format!(" ({})", condition.coverage));
    }
    line
}

/// Deterministic, non-cryptographic scope checksum: a hash over the sorted
/// block-id and signal-name sets. Intentionally coarse.
fn generate_scope_checksum(scope: &ExclusionScope) -> String {
    let mut block_ids: Vec<&String> = scope.block_exclusions.keys().collect();
    block_ids.sort();
    let mut signal_names: Vec<&String> = scope.toggle_exclusions.keys().collect();
    signal_names.sort();

    let mut hasher = DefaultHasher::new();
    for block_id in block_ids {
        block_id.hash(&mut hasher);
    }
    for signal_name in signal_names {
        signal_name.hash(&mut hasher);
    }
    hasher.finish().to_string()
}
