//! One-pass index construction.
//!
//! Every record is converted to `AbiEntry`s keyed by their own computed
//! selector. Duplicate top-level keys are merged, never overwritten; true
//! selector collisions (distinct signatures sharing 4 bytes) are kept side
//! by side. Both are logged as warnings.

use abiscope_core::{
    entry::{AbiEntry, EntryKind},
    error::IndexError,
    selector::Selector,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::abi::{entries_from_abi, parse_abi};
use crate::index::{Collision, ContractRecord, KeyMatch, SelectorIndex};
use crate::table::{SelectorTable, TableRecord};

/// A top-level key declared by more than one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub key: Selector,
    pub contracts: Vec<String>,
}

/// A record whose top-level key matches none of its own selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedKey {
    pub key: Selector,
    pub contract: String,
}

/// A record left out of the index because its ABI could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub key: String,
    pub contract: String,
    pub reason: String,
}

/// What the builder saw while building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Records read from the table
    pub records: usize,
    /// Distinct contract names
    pub contracts: usize,
    /// Entries indexed after de-duplication
    pub entries: usize,
    /// Distinct selectors
    pub selectors: usize,
    pub duplicate_keys: Vec<DuplicateKey>,
    pub collisions: Vec<Collision>,
    pub unverified_keys: Vec<UnverifiedKey>,
    pub skipped: Vec<SkippedRecord>,
}

/// Builds a `SelectorIndex` from a `SelectorTable`.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    skip_invalid: bool,
    verify_keys: bool,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            skip_invalid: false,
            verify_keys: true,
        }
    }

    /// Skip records with unparsable keys or ABIs instead of failing the build.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Check each top-level key against the record's own selectors.
    pub fn verify_keys(mut self, verify: bool) -> Self {
        self.verify_keys = verify;
        self
    }

    pub fn build(&self, table: &SelectorTable) -> Result<SelectorIndex, IndexError> {
        let mut index = SelectorIndex::default();
        let mut report = IndexReport {
            records: table.len(),
            ..IndexReport::default()
        };

        for record in table.records() {
            let (key, entries) = match convert(record) {
                Ok(converted) => converted,
                Err(err) if self.skip_invalid => {
                    warn!(key = %record.selector, contract = %record.name, error = %err, "skipping table record");
                    report.skipped.push(SkippedRecord {
                        key: record.selector.clone(),
                        contract: record.name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            let key_match = if self.verify_keys {
                classify_key(key, &entries)
            } else {
                KeyMatch::NotChecked
            };
            if key_match == KeyMatch::Unmatched {
                debug!(key = %key, contract = %record.name, "table key matches none of the record's selectors");
                report.unverified_keys.push(UnverifiedKey {
                    key,
                    contract: record.name.clone(),
                });
            }

            let mut indexed = Vec::with_capacity(entries.len());
            for entry in entries {
                indexed.push(insert_entry(&mut index, entry));
            }

            let contract = Arc::new(ContractRecord {
                key,
                name: record.name.clone(),
                functions_names: record.functions_names.clone(),
                entries: indexed,
                key_match,
            });

            let under_key = index.by_key.entry(key).or_default();
            if !under_key.is_empty() {
                warn!(
                    key = %key,
                    existing = ?under_key.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                    added = %contract.name,
                    "duplicate table key; merging records"
                );
            }
            under_key.push(contract.clone());
            index.by_name.entry(contract.name.clone()).or_insert(contract);
        }

        report.duplicate_keys = index
            .by_key
            .iter()
            .filter(|(_, records)| records.len() > 1)
            .map(|(key, records)| DuplicateKey {
                key: *key,
                contracts: records.iter().map(|c| c.name.clone()).collect(),
            })
            .collect();

        report.collisions = find_collisions(&index);
        for collision in &report.collisions {
            warn!(
                selector = %collision.selector,
                signatures = ?collision.signatures,
                "selector collision between distinct signatures"
            );
        }

        report.contracts = index.by_name.len();
        report.entries = index.len();
        report.selectors = index.by_selector.len();

        info!(
            records = report.records,
            entries = report.entries,
            selectors = report.selectors,
            duplicate_keys = report.duplicate_keys.len(),
            collisions = report.collisions.len(),
            unverified_keys = report.unverified_keys.len(),
            skipped = report.skipped.len(),
            "selector index built"
        );

        index.report = report;
        Ok(index)
    }
}

fn convert(record: &TableRecord) -> Result<(Selector, Vec<AbiEntry>), IndexError> {
    let key: Selector = record
        .selector
        .parse()
        .map_err(|e: abiscope_core::SelectorParseError| IndexError::InvalidKey {
            key: record.selector.clone(),
            reason: e.to_string(),
        })?;
    let abi = parse_abi(&record.abi).map_err(|e| IndexError::InvalidAbi {
        contract: record.name.clone(),
        key: record.selector.clone(),
        reason: e.to_string(),
    })?;
    Ok((key, entries_from_abi(&record.name, &abi)))
}

/// Insert `entry` under its own selector unless the same contract already
/// declared the same fragment. Returns the shared handle either way.
fn insert_entry(index: &mut SelectorIndex, entry: AbiEntry) -> Arc<AbiEntry> {
    let slot = index.by_selector.entry(entry.selector).or_default();
    if let Some(existing) = slot.iter().find(|e| e.same_declaration(&entry)) {
        return existing.clone();
    }
    let entry = Arc::new(entry);
    slot.push(entry.clone());
    if let Some(topic) = entry.topic0 {
        index.by_topic.entry(topic).or_default().push(entry.clone());
    }
    entry
}

fn classify_key(key: Selector, entries: &[AbiEntry]) -> KeyMatch {
    entries
        .iter()
        .find(|e| e.selector == key)
        .map(|e| match e.kind {
            EntryKind::Function => KeyMatch::Function(e.signature()),
            EntryKind::Error => KeyMatch::Error(e.signature()),
            EntryKind::Event => KeyMatch::Event(e.signature()),
        })
        .unwrap_or(KeyMatch::Unmatched)
}

fn find_collisions(index: &SelectorIndex) -> Vec<Collision> {
    index
        .by_selector
        .iter()
        .filter_map(|(selector, entries)| {
            let mut signatures: IndexMap<String, ()> = IndexMap::new();
            for entry in entries {
                signatures.insert(entry.signature(), ());
            }
            (signatures.len() > 1).then(|| Collision {
                selector: *selector,
                signatures: signatures.into_keys().collect(),
            })
        })
        .collect()
}
