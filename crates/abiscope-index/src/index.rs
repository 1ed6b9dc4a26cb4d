//! The immutable selector index.
//!
//! Built once by `IndexBuilder`, read-only afterwards. All maps preserve
//! table declaration order so collision lists come back in the order the
//! contracts were declared.

use abiscope_core::{entry::AbiEntry, lookup::SelectorLookup, selector::Selector};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::builder::IndexReport;

/// How a record's top-level table key relates to the record's own ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "signature", rename_all = "snake_case")]
pub enum KeyMatch {
    /// The key is the selector of this function
    Function(String),
    /// The key is the selector of this custom error
    Error(String),
    /// The key is the truncated topic of this event
    Event(String),
    /// The key matches nothing the record declares
    Unmatched,
    /// Key verification was turned off for this build
    NotChecked,
}

impl KeyMatch {
    pub fn is_verified(&self) -> bool {
        !matches!(self, KeyMatch::Unmatched | KeyMatch::NotChecked)
    }
}

/// One table record after conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Top-level table key
    pub key: Selector,
    /// Contract or interface name
    pub name: String,
    pub functions_names: Vec<String>,
    /// Every function, error and event the record declares
    pub entries: Vec<Arc<AbiEntry>>,
    pub key_match: KeyMatch,
}

/// A selector shared by more than one distinct signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub selector: Selector,
    /// Distinct signatures, in first-declared order
    pub signatures: Vec<String>,
}

/// Selector → entries multimap plus contract-level views.
#[derive(Debug, Default)]
pub struct SelectorIndex {
    pub(crate) by_selector: IndexMap<Selector, Vec<Arc<AbiEntry>>>,
    pub(crate) by_topic: IndexMap<[u8; 32], Vec<Arc<AbiEntry>>>,
    pub(crate) by_key: IndexMap<Selector, Vec<Arc<ContractRecord>>>,
    pub(crate) by_name: IndexMap<String, Arc<ContractRecord>>,
    pub(crate) report: IndexReport,
}

impl SelectorIndex {
    /// An index with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All entries carrying `selector`, in declaration order.
    pub fn lookup(&self, selector: Selector) -> Vec<Arc<AbiEntry>> {
        self.by_selector.get(&selector).cloned().unwrap_or_default()
    }

    /// Every record registered under a top-level table key, duplicates
    /// included, in source order.
    pub fn contracts_for_key(&self, key: Selector) -> Vec<Arc<ContractRecord>> {
        self.by_key.get(&key).cloned().unwrap_or_default()
    }

    /// First record registered under `name`.
    pub fn contract(&self, name: &str) -> Option<Arc<ContractRecord>> {
        self.by_name.get(name).cloned()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &Arc<ContractRecord>> {
        self.by_name.values()
    }

    /// Selectors shared by distinct signatures.
    pub fn collisions(&self) -> &[Collision] {
        &self.report.collisions
    }

    /// Statistics and findings from the build.
    pub fn report(&self) -> &IndexReport {
        &self.report
    }

    /// Total number of indexed entries.
    pub fn len(&self) -> usize {
        self.by_selector.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_selector.is_empty()
    }

    pub fn selector_count(&self) -> usize {
        self.by_selector.len()
    }
}

impl SelectorLookup for SelectorIndex {
    fn lookup(&self, selector: Selector) -> Vec<Arc<AbiEntry>> {
        SelectorIndex::lookup(self, selector)
    }

    fn lookup_event(&self, topic0: &[u8; 32]) -> Vec<Arc<AbiEntry>> {
        self.by_topic.get(topic0).cloned().unwrap_or_default()
    }

    fn selector_count(&self) -> usize {
        SelectorIndex::selector_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_returns_nothing() {
        let index = SelectorIndex::empty();
        let unknown: Selector = "ffffffff".parse().unwrap();
        assert!(index.lookup(unknown).is_empty());
        assert!(index.contracts_for_key(unknown).is_empty());
        assert!(index.lookup_event(&[0u8; 32]).is_empty());
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn key_match_serde_shape() {
        let json = serde_json::to_string(&KeyMatch::Function("pause()".into())).unwrap();
        assert_eq!(json, r#"{"kind":"function","signature":"pause()"}"#);
        assert!(!KeyMatch::Unmatched.is_verified());
        assert!(!KeyMatch::NotChecked.is_verified());
        assert_eq!(
            serde_json::to_string(&KeyMatch::NotChecked).unwrap(),
            r#"{"kind":"not_checked"}"#
        );
    }
}
