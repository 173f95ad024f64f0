//! Hierarchical exclusion scope
//!
//! A scope corresponds to a `MODULE:` (design type) or `INSTANCE:` (specific
//! instantiation) declaration in the file. It owns four independent record
//! collections, each keyed to keep identifiers unique within its own
//! category but not across categories.

use super::block::BlockExclusion;
use super::condition::ConditionExclusion;
use super::fsm::FsmExclusion;
use super::toggle::ToggleExclusion;
use super::types::ExclusionType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One hierarchical design scope and its exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionScope {
    /// Full hierarchical name of the scope
    pub name: String,
    /// Scope checksum, if one was declared before the scope line
    pub checksum: Option<String>,
    /// true for `MODULE:`, false for `INSTANCE:`
    pub is_module: bool,
    /// Block exclusions keyed by block id; a later duplicate id overwrites
    pub block_exclusions: IndexMap<String, BlockExclusion>,
    /// Toggle exclusions keyed by signal name; a signal may record both
    /// directions and several bit indices, so the values are append-only lists
    pub toggle_exclusions: IndexMap<String, Vec<ToggleExclusion>>,
    /// FSM exclusions keyed by FSM name; a name may carry a state-level
    /// record and any number of transition records
    pub fsm_exclusions: IndexMap<String, Vec<FsmExclusion>>,
    /// Condition exclusions keyed by condition id; last write wins
    pub condition_exclusions: IndexMap<String, ConditionExclusion>,
}

impl ExclusionScope {
    pub fn new(name: impl Into<String>, checksum: Option<String>, is_module: bool) -> Self {
        Self {
            name: name.into(),
            checksum,
            is_module,
            block_exclusions: IndexMap::new(),
            toggle_exclusions: IndexMap::new(),
            fsm_exclusions: IndexMap::new(),
            condition_exclusions: IndexMap::new(),
        }
    }

    pub fn add_block(&mut self, exclusion: BlockExclusion) {
        self.block_exclusions.insert(exclusion.id.clone(), exclusion);
    }

    pub fn add_toggle(&mut self, exclusion: ToggleExclusion) {
        self.toggle_exclusions
            .entry(exclusion.signal_name.clone())
            .or_default()
            .push(exclusion);
    }

    pub fn add_fsm(&mut self, exclusion: FsmExclusion) {
        self.fsm_exclusions
            .entry(exclusion.fsm_name.clone())
            .or_default()
            .push(exclusion);
    }

    pub fn add_condition(&mut self, exclusion: ConditionExclusion) {
        self.condition_exclusions
            .insert(exclusion.condition_id.clone(), exclusion);
    }

    /// Total number of exclusion records in this scope across all categories.
    pub fn total_exclusion_count(&self) -> usize {
        self.block_exclusions.len()
            + self.condition_exclusions.len()
            + self.toggle_exclusions.values().map(Vec::len).sum::<usize>()
            + self.fsm_exclusions.values().map(Vec::len).sum::<usize>()
    }

    /// Record counts per category for this scope.
    pub fn counts_by_type(&self) -> HashMap<ExclusionType, usize> {
        let mut counts = HashMap::new();
        counts.insert(ExclusionType::Block, self.block_exclusions.len());
        counts.insert(
            ExclusionType::Toggle,
            self.toggle_exclusions.values().map(Vec::len).sum(),
        );
        counts.insert(
            ExclusionType::Fsm,
            self.fsm_exclusions.values().map(Vec::len).sum(),
        );
        counts.insert(ExclusionType::Condition, self.condition_exclusions.len());
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::ToggleDirection;
    use super::*;

    #[test]
    fn test_duplicate_block_id_overwrites() {
        let mut scope = ExclusionScope::new("top", None, true);
        scope.add_block(BlockExclusion::new("b1", "111", "a = 1;"));
        scope.add_block(BlockExclusion::new("b1", "222", "a = 2;"));
        assert_eq!(scope.block_exclusions.len(), 1);
        assert_eq!(scope.block_exclusions["b1"].checksum, "222");
    }

    #[test]
    fn test_toggle_list_appends() {
        let mut scope = ExclusionScope::new("top", None, false);
        scope.add_toggle(ToggleExclusion::new(ToggleDirection::ZeroToOne, "clk", "net clk"));
        scope.add_toggle(ToggleExclusion::new(ToggleDirection::OneToZero, "clk", "net clk"));
        assert_eq!(scope.toggle_exclusions.len(), 1);
        assert_eq!(scope.toggle_exclusions["clk"].len(), 2);
    }

    #[test]
    fn test_fsm_state_and_transitions_share_bucket() {
        let mut scope = ExclusionScope::new("top", None, true);
        scope.add_fsm(FsmExclusion::state("ctrl", "123"));
        scope.add_fsm(FsmExclusion::transition("ctrl", "A", "B", "01"));
        assert_eq!(scope.fsm_exclusions["ctrl"].len(), 2);
    }

    #[test]
    fn test_total_exclusion_count() {
        let mut scope = ExclusionScope::new("top", None, true);
        scope.add_block(BlockExclusion::new("b1", "1", "x;"));
        scope.add_toggle(ToggleExclusion::new(ToggleDirection::Both, "sig", "net sig"));
        scope.add_toggle(ToggleExclusion::new(ToggleDirection::Both, "sig2", "net sig2"));
        scope.add_condition(ConditionExclusion::new("c1", "9", "(a)"));
        assert_eq!(scope.total_exclusion_count(), 4);
        assert_eq!(scope.counts_by_type()[&ExclusionType::Toggle], 2);
    }
}
