//! The static selector table: `selector -> { name, abi, functions_names }`.
//!
//! Exports of the table may contain the same top-level key more than once.
//! A plain map collapses those to the last record; the table keeps every
//! record in source order so the builder can merge them.

use abiscope_core::error::IndexError;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One record of the table, as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    /// Top-level key, normally 8 hex chars. A weak hint only.
    pub selector: String,
    /// Contract or interface name, e.g. "ERC20PresetMinterPauser"
    pub name: String,
    /// Standard JSON ABI array (or a string containing one)
    pub abi: serde_json::Value,
    /// Flattened function names, informational
    #[serde(default)]
    pub functions_names: Vec<String>,
}

/// Record body under a top-level key in the object encoding.
#[derive(Deserialize)]
struct RecordBody {
    name: String,
    abi: serde_json::Value,
    #[serde(default)]
    functions_names: Vec<String>,
}

/// The parsed table, duplicates preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorTable {
    records: Vec<TableRecord>,
}

impl SelectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TableRecord>) -> Self {
        Self { records }
    }

    /// Parse a table from JSON: either an object keyed by selector (duplicate
    /// keys allowed) or an array of `{ selector, name, abi, functions_names }`.
    pub fn from_json_str(json: &str) -> Result<Self, IndexError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a table file.
    pub fn from_path(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn push(&mut self, record: TableRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys that occur more than once, with their record names in source order.
    pub fn duplicate_keys(&self) -> Vec<(String, Vec<String>)> {
        let mut by_key: IndexMap<String, Vec<String>> = IndexMap::new();
        for record in &self.records {
            by_key
                .entry(record.selector.to_ascii_lowercase())
                .or_default()
                .push(record.name.clone());
        }
        by_key.into_iter().filter(|(_, names)| names.len() > 1).collect()
    }
}

impl<'de> Deserialize<'de> for SelectorTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TableVisitor)
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = SelectorTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a selector table object or an array of table records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, body)) = map.next_entry::<String, RecordBody>()? {
            records.push(TableRecord {
                selector: key,
                name: body.name,
                abi: body.abi,
                functions_names: body.functions_names,
            });
        }
        Ok(SelectorTable { records })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut records = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(record) = seq.next_element::<TableRecord>()? {
            records.push(record);
        }
        Ok(SelectorTable { records })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SelectorTable::default())
    }
}
