//! Query, merge and statistics layer over an exclusion database
//!
//! [`ExclusionDataManager`] exclusively owns an [`ExclusionData`] instance
//! and provides the operations external tools drive: multi-criteria search,
//! scope-name glob matching, merge, statistics, duplicate scans, structural
//! validation, record removal and a memory estimate. Clone operations return
//! new owned instances; nothing aliases the managed database.

use super::model::{
    ExclusionData, ExclusionScope, ExclusionType, FsmExclusionKind, ToggleExclusion,
};
use super::pattern::GlobPattern;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::mem;

/// Filter set for [`ExclusionDataManager::search`] and
/// [`ExclusionDataManager::remove_exclusions`]. Every field is optional; a
/// record matches when all set criteria hold. String criteria are substring
/// matches, and `signal_name` applies to the toggle category only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    /// Restrict to one exclusion category
    pub exclusion_type: Option<ExclusionType>,
    /// Scope-name substring
    pub scope_name: Option<String>,
    /// Annotation substring; records without an annotation never match
    pub annotation: Option<String>,
    /// Signal-name substring, toggles only
    pub signal_name: Option<String>,
    /// Restrict to module (`true`) or instance (`false`) scopes
    pub is_module: Option<bool>,
}

/// Aggregate statistics over a database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionStatistics {
    pub total_scopes: usize,
    pub module_scopes: usize,
    pub instance_scopes: usize,
    pub total_exclusions: usize,
    /// Record counts per category
    pub exclusions_by_type: HashMap<ExclusionType, usize>,
    /// Record counts per scope name
    pub exclusions_by_scope: HashMap<String, usize>,
    /// Records across all categories carrying a non-empty annotation
    pub annotated_exclusions: usize,
}

impl fmt::Display for ExclusionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Exclusion Statistics:")?;
        writeln!(f, "  Total Scopes: {}", self.total_scopes)?;
        writeln!(f, "    Modules: {}", self.module_scopes)?;
        writeln!(f, "    Instances: {}", self.instance_scopes)?;
        writeln!(f, "  Total Exclusions: {}", self.total_exclusions)?;
        writeln!(f, "    Annotated: {}", self.annotated_exclusions)?;
        writeln!(f, "  By Type:")?;
        for exclusion_type in ExclusionType::ALL {
            writeln!(
                f,
                "    {}: {}",
                exclusion_type,
                self.exclusions_by_type.get(&exclusion_type).unwrap_or(&0)
            )?;
        }
        Ok(())
    }
}

/// High-level manager for exclusion coverage data.
#[derive(Debug, Default)]
pub struct ExclusionDataManager {
    data: ExclusionData,
}

impl ExclusionDataManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: ExclusionData) -> Self {
        Self { data }
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

    /// Take the database out of the manager, leaving an empty one behind.
    pub fn take_data(&mut self) -> ExclusionData {
        mem::take(&mut self.data)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.data.scopes.is_empty()
    }

    /// Deep copy of the managed database.
    pub fn clone_data(&self) -> ExclusionData {
        self.data.clone()
    }

    /// Merge another database into the managed one; see
    /// [`ExclusionData::merge`] for the collision rules.
    pub fn merge_data(&mut self, other: &ExclusionData, overwrite_existing: bool) {
        self.data.merge(other, overwrite_existing);
    }

    /// Multi-criteria search returning one `(scope_name, category)` pair per
    /// matching record.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<(String, ExclusionType)> {
        let mut results = Vec::new();

        for (scope_name, scope) in &self.data.scopes {
            if !scope_matches(scope_name, scope, criteria) {
                continue;
            }

            if type_allowed(criteria, ExclusionType::Block) {
                for block in scope.block_exclusions.values() {
                    if annotation_matches(&block.annotation, criteria) {
                        results.push((scope_name.clone(), ExclusionType::Block));
                    }
                }
            }
            if type_allowed(criteria, ExclusionType::Toggle) {
                for (signal_name, toggles) in &scope.toggle_exclusions {
                    if let Some(filter) = &criteria.signal_name {
                        if !signal_name.contains(filter.as_str()) {
                            continue;
                        }
                    }
                    for toggle in toggles {
                        if annotation_matches(&toggle.annotation, criteria) {
                            results.push((scope_name.clone(), ExclusionType::Toggle));
                        }
                    }
                }
            }
            if type_allowed(criteria, ExclusionType::Fsm) {
                for fsms in scope.fsm_exclusions.values() {
                    for fsm in fsms {
                        if annotation_matches(&fsm.annotation, criteria) {
                            results.push((scope_name.clone(), ExclusionType::Fsm));
                        }
                    }
                }
            }
            if type_allowed(criteria, ExclusionType::Condition) {
                for condition in scope.condition_exclusions.values() {
                    if annotation_matches(&condition.annotation, criteria) {
                        results.push((scope_name.clone(), ExclusionType::Condition));
                    }
                }
            }
        }

        results
    }

    pub fn find_scope(&self, scope_name: &str) -> Option<&ExclusionScope> {
        self.data.scopes.get(scope_name)
    }

    /// Scope names matching a glob pattern (`*` and `?` wildcards, anchored,
    /// case-sensitive). An invalid pattern matches nothing.
    pub fn find_scopes_matching(&self, pattern: &str) -> Vec<String> {
        let Ok(glob) = GlobPattern::new(pattern, true) else {
            return Vec::new();
        };
        self.data
            .scopes
            .keys()
            .filter(|name| glob.is_match(name))
            .cloned()
            .collect()
    }

    /// All signal names with at least one toggle exclusion.
    pub fn all_signal_names(&self) -> HashSet<String> {
        self.data
            .scopes
            .values()
            .flat_map(|scope| scope.toggle_exclusions.keys().cloned())
            .collect()
    }

    /// All FSM names with at least one exclusion.
    pub fn all_fsm_names(&self) -> HashSet<String> {
        self.data
            .scopes
            .values()
            .flat_map(|scope| scope.fsm_exclusions.keys().cloned())
            .collect()
    }

    /// Aggregate statistics over the whole database.
    pub fn statistics(&self) -> ExclusionStatistics {
        let mut stats = ExclusionStatistics {
            total_scopes: self.data.scopes.len(),
            ..ExclusionStatistics::default()
        };

        for (scope_name, scope) in &self.data.scopes {
            if scope.is_module {
                stats.module_scopes += 1;
            } else {
                stats.instance_scopes += 1;
            }

            let scope_exclusions = scope.total_exclusion_count();
            stats.total_exclusions += scope_exclusions;
            stats
                .exclusions_by_scope
                .insert(scope_name.clone(), scope_exclusions);

            stats.annotated_exclusions += scope
                .block_exclusions
                .values()
                .filter(|b| is_annotated(&b.annotation))
                .count();
            stats.annotated_exclusions += scope
                .toggle_exclusions
                .values()
                .flatten()
                .filter(|t| is_annotated(&t.annotation))
                .count();
            stats.annotated_exclusions += scope
                .fsm_exclusions
                .values()
                .flatten()
                .filter(|f| is_annotated(&f.annotation))
                .count();
            stats.annotated_exclusions += scope
                .condition_exclusions
                .values()
                .filter(|c| is_annotated(&c.annotation))
                .count();
        }

        stats.exclusions_by_type = self.data.exclusion_counts_by_type();
        stats
    }

    /// Linear scan for annotation substrings, producing
    /// `(scope_name, "<Category> <identifier>")` labels. List categories
    /// carry the record's position, e.g. `Toggle clk[0]`.
    pub fn find_by_annotation(
        &self,
        annotation_substring: &str,
        case_sensitive: bool,
    ) -> Vec<(String, String)> {
        let needle = fold_case(annotation_substring, case_sensitive);
        let mut results = Vec::new();

        let matches =
            |annotation: &Option<String>| match annotation {
                Some(text) => fold_case(text, case_sensitive).contains(&needle),
                None => false,
            };

        for (scope_name, scope) in &self.data.scopes {
            for (block_id, block) in &scope.block_exclusions {
                if matches(&block.annotation) {
                    results.push((scope_name.clone(), format!("Block {}", block_id)));
                }
            }
            for (signal_name, toggles) in &scope.toggle_exclusions {
                for (index, toggle) in toggles.iter().enumerate() {
                    if matches(&toggle.annotation) {
                        results.push((
                            scope_name.clone(),
                            format!("Toggle {}[{}]", signal_name, index),
                        ));
                    }
                }
            }
            for (fsm_name, fsms) in &scope.fsm_exclusions {
                for (index, fsm) in fsms.iter().enumerate() {
                    if matches(&fsm.annotation) {
                        results.push((scope_name.clone(), format!("FSM {}[{}]", fsm_name, index)));
                    }
                }
            }
            for (condition_id, condition) in &scope.condition_exclusions {
                if matches(&condition.annotation) {
                    results.push((scope_name.clone(), format!("Condition {}", condition_id)));
                }
            }
        }

        results
    }

    /// Group scope names by identical non-empty checksum; only groups with
    /// more than one member are returned.
    pub fn find_potential_duplicates(&self) -> HashMap<String, Vec<String>> {
        let mut checksum_to_scopes: HashMap<String, Vec<String>> = HashMap::new();

        for (scope_name, scope) in &self.data.scopes {
            if let Some(checksum) = &scope.checksum {
                if !checksum.is_empty() {
                    checksum_to_scopes
                        .entry(checksum.clone())
                        .or_default()
                        .push(scope_name.clone());
                }
            }
        }

        checksum_to_scopes
            .into_iter()
            .filter(|(_, scopes)| scopes.len() > 1)
            .collect()
    }

    /// Structural sanity scan: empty scope names and empty identifiers in
    /// any category.
    pub fn validate_data(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (scope_name, scope) in &self.data.scopes {
            if scope_name.is_empty() {
                errors.push("Found scope with empty name".to_string());
            }
            for block_id in scope.block_exclusions.keys() {
                if block_id.is_empty() {
                    errors.push(format!(
                        "Found block exclusion with empty ID in scope: {}",
                        scope_name
                    ));
                }
            }
            for signal_name in scope.toggle_exclusions.keys() {
                if signal_name.is_empty() {
                    errors.push(format!(
                        "Found toggle exclusion with empty signal name in scope: {}",
                        scope_name
                    ));
                }
            }
            for fsm_name in scope.fsm_exclusions.keys() {
                if fsm_name.is_empty() {
                    errors.push(format!(
                        "Found FSM exclusion with empty name in scope: {}",
                        scope_name
                    ));
                }
            }
            for condition_id in scope.condition_exclusions.keys() {
                if condition_id.is_empty() {
                    errors.push(format!(
                        "Found condition exclusion with empty ID in scope: {}",
                        scope_name
                    ));
                }
            }
        }

        errors
    }

    /// Remove every record matching the criteria, uniformly across all four
    /// categories; per-name lists emptied by the removal are dropped.
    /// Returns the number of records removed.
    pub fn remove_exclusions(&mut self, criteria: &SearchCriteria) -> usize {
        let mut removed = 0;

        for (scope_name, scope) in self.data.scopes.iter_mut() {
            if let Some(filter) = &criteria.scope_name {
                if !scope_name.contains(filter.as_str()) {
                    continue;
                }
            }
            if let Some(is_module) = criteria.is_module {
                if scope.is_module != is_module {
                    continue;
                }
            }

            if type_allowed(criteria, ExclusionType::Block) {
                let before = scope.block_exclusions.len();
                scope
                    .block_exclusions
                    .retain(|_, block| !annotation_matches(&block.annotation, criteria));
                removed += before - scope.block_exclusions.len();
            }
            if type_allowed(criteria, ExclusionType::Toggle) {
                for toggles in scope.toggle_exclusions.values_mut() {
                    let before = toggles.len();
                    toggles.retain(|toggle| !toggle_removal_matches(toggle, criteria));
                    removed += before - toggles.len();
                }
                scope.toggle_exclusions.retain(|_, toggles| !toggles.is_empty());
            }
            if type_allowed(criteria, ExclusionType::Fsm) {
                for fsms in scope.fsm_exclusions.values_mut() {
                    let before = fsms.len();
                    fsms.retain(|fsm| !annotation_matches(&fsm.annotation, criteria));
                    removed += before - fsms.len();
                }
                scope.fsm_exclusions.retain(|_, fsms| !fsms.is_empty());
            }
            if type_allowed(criteria, ExclusionType::Condition) {
                let before = scope.condition_exclusions.len();
                scope
                    .condition_exclusions
                    .retain(|_, condition| !annotation_matches(&condition.annotation, criteria));
                removed += before - scope.condition_exclusions.len();
            }
        }

        removed
    }

    /// Byte estimate of the database held in memory: string lengths plus a
    /// fixed per-record overhead.
    pub fn memory_usage(&self) -> usize {
        let mut usage = mem::size_of::<ExclusionData>();

        for (scope_name, scope) in &self.data.scopes {
            usage += scope_name.len();
            usage += scope.name.len();
            usage += scope.checksum.as_deref().map_or(0, str::len);
            usage += mem::size_of::<ExclusionScope>();

            for (block_id, block) in &scope.block_exclusions {
                usage += mem::size_of_val(block);
                usage += block_id.len()
                    + block.checksum.len()
                    + block.source_code.len()
                    + annotation_len(&block.annotation);
            }
            for (signal_name, toggles) in &scope.toggle_exclusions {
                usage += signal_name.len();
                for toggle in toggles {
                    usage += mem::size_of_val(toggle);
                    usage += toggle.signal_name.len()
                        + toggle.net_description.len()
                        + annotation_len(&toggle.annotation);
                }
            }
            for (fsm_name, fsms) in &scope.fsm_exclusions {
                usage += fsm_name.len();
                for fsm in fsms {
                    usage += mem::size_of_val(fsm);
                    usage += fsm.fsm_name.len() + annotation_len(&fsm.annotation);
                    usage += match &fsm.kind {
                        FsmExclusionKind::State { checksum } => checksum.len(),
                        FsmExclusionKind::Transition {
                            from_state,
                            to_state,
                            transition_id,
                        } => from_state.len() + to_state.len() + transition_id.len(),
                    };
                }
            }
            for (condition_id, condition) in &scope.condition_exclusions {
                usage += mem::size_of_val(condition);
                usage += condition_id.len()
                    + condition.checksum.len()
                    + condition.expression.len()
                    + condition.parameters.len()
                    + condition.coverage.len()
                    + annotation_len(&condition.annotation);
            }
        }

        usage
    }
}

fn type_allowed(criteria: &SearchCriteria, exclusion_type: ExclusionType) -> bool {
    criteria
        .exclusion_type
        .map_or(true, |filter| filter == exclusion_type)
}

fn scope_matches(scope_name: &str, scope: &ExclusionScope, criteria: &SearchCriteria) -> bool {
    if let Some(filter) = &criteria.scope_name {
        if !scope_name.contains(filter.as_str()) {
            return false;
        }
    }
    if let Some(is_module) = criteria.is_module {
        if scope.is_module != is_module {
            return false;
        }
    }
    true
}

fn annotation_matches(annotation: &Option<String>, criteria: &SearchCriteria) -> bool {
    match &criteria.annotation {
        Some(filter) => annotation
            .as_deref()
            .map_or(false, |text| text.contains(filter.as_str())),
        None => true,
    }
}

fn toggle_removal_matches(toggle: &ToggleExclusion, criteria: &SearchCriteria) -> bool {
    if let Some(filter) = &criteria.signal_name {
        if !toggle.signal_name.contains(filter.as_str()) {
            return false;
        }
    }
    annotation_matches(&toggle.annotation, criteria)
}

fn is_annotated(annotation: &Option<String>) -> bool {
    annotation.as_deref().map_or(false, |text| !text.is_empty())
}

fn annotation_len(annotation: &Option<String>) -> usize {
    annotation.as_deref().map_or(0, str::len)
}

fn fold_case(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}
