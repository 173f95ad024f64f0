//! Root container for a parsed exclusion database

use super::scope::ExclusionScope;
use super::types::ExclusionType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The complete contents of one exclusion database.
///
/// An instance is exclusively owned: the parser builds one per session and
/// hands it off by value, and merge/clone operations produce new owned
/// instances rather than aliasing. Header fields are free-form strings and
/// each is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionData {
    /// Source file name, empty for programmatic or string inputs
    pub file_name: String,
    /// `Generated By User:` header field
    pub generated_by: Option<String>,
    /// `Format Version:` header field
    pub format_version: Option<String>,
    /// `Date:` header field
    pub generation_date: Option<String>,
    /// `ExclMode:` header field
    pub exclusion_mode: Option<String>,
    /// Free-form key/value pairs for callers; not part of the wire format
    pub metadata: IndexMap<String, String>,
    /// All scopes keyed by scope name, in declaration order
    pub scopes: IndexMap<String, ExclusionScope>,
}

impl ExclusionData {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// Look up a scope, creating it if absent.
    ///
    /// An existing scope keeps its original checksum and module/instance
    /// kind; the arguments only apply on creation.
    pub fn get_or_create_scope(
        &mut self,
        name: &str,
        checksum: Option<String>,
        is_module: bool,
    ) -> &mut ExclusionScope {
        self.scopes
            .entry(name.to_string())
            .or_insert_with(|| ExclusionScope::new(name, checksum, is_module))
    }

    /// Merge another database into this one.
    ///
    /// Scopes absent locally are added as deep copies. On a name collision,
    /// `overwrite_existing = false` keeps the local scope untouched and
    /// `true` replaces it wholesale with the other side's scope.
    pub fn merge(&mut self, other: &ExclusionData, overwrite_existing: bool) {
        for (scope_name, scope) in &other.scopes {
            if overwrite_existing || !self.scopes.contains_key(scope_name) {
                self.scopes.insert(scope_name.clone(), scope.clone());
            }
        }
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.file_name.clear();
        self.generated_by = None;
        self.format_version = None;
        self.generation_date = None;
        self.exclusion_mode = None;
        self.metadata.clear();
        self.scopes.clear();
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Total number of exclusion records across all scopes.
    pub fn total_exclusion_count(&self) -> usize {
        self.scopes
            .values()
            .map(ExclusionScope::total_exclusion_count)
            .sum()
    }

    /// Record counts per category across all scopes.
    pub fn exclusion_counts_by_type(&self) -> HashMap<ExclusionType, usize> {
        let mut counts: HashMap<ExclusionType, usize> =
            ExclusionType::ALL.iter().map(|ty| (*ty, 0)).collect();
        for scope in self.scopes.values() {
            for (ty, count) in scope.counts_by_type() {
                *counts.entry(ty).or_insert(0) += count;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::super::block::BlockExclusion;
    use super::*;

    fn scope_with_block(name: &str, block_id: &str) -> ExclusionData {
        let mut data = ExclusionData::default();
        let scope = data.get_or_create_scope(name, None, true);
        scope.add_block(BlockExclusion::new(block_id, "1", "x;"));
        data
    }

    #[test]
    fn test_get_or_create_scope_keeps_existing() {
        let mut data = ExclusionData::default();
        data.get_or_create_scope("top", Some("111".into()), true);
        let scope = data.get_or_create_scope("top", Some("222".into()), false);
        assert_eq!(scope.checksum.as_deref(), Some("111"));
        assert!(scope.is_module);
    }

    #[test]
    fn test_merge_keeps_existing_scope() {
        let mut a = scope_with_block("top", "b1");
        let b = scope_with_block("top", "b2");
        a.merge(&b, false);
        assert!(a.scopes["top"].block_exclusions.contains_key("b1"));
        assert!(!a.scopes["top"].block_exclusions.contains_key("b2"));
    }

    #[test]
    fn test_merge_overwrite_replaces_scope() {
        let mut a = scope_with_block("top", "b1");
        let b = scope_with_block("top", "b2");
        a.merge(&b, true);
        assert!(!a.scopes["top"].block_exclusions.contains_key("b1"));
        assert!(a.scopes["top"].block_exclusions.contains_key("b2"));
    }

    #[test]
    fn test_merge_adds_new_scopes() {
        let mut a = scope_with_block("top", "b1");
        let b = scope_with_block("core", "b2");
        a.merge(&b, false);
        assert_eq!(a.scope_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut data = scope_with_block("top", "b1");
        data.generated_by = Some("user".into());
        data.clear();
        assert!(data.is_empty());
        assert!(data.generated_by.is_none());
    }

    #[test]
    fn test_counts_by_type() {
        let data = scope_with_block("top", "b1");
        let counts = data.exclusion_counts_by_type();
        assert_eq!(counts[&ExclusionType::Block], 1);
        assert_eq!(counts[&ExclusionType::Toggle], 0);
        assert_eq!(data.total_exclusion_count(), 1);
    }
}
