//! `DecodeEngine`: the decode request interface over a shared selector index.

use abiscope_core::{
    call::{Candidate, DecodedLog, Resolution},
    entry::EntryKind,
    lookup::SelectorLookup,
    selector::Selector,
};
use abiscope_evm::{decode_log, resolve};
use abiscope_index::{IndexBuilder, IndexReport, SelectorIndex, SelectorTable, SharedIndex};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::request::DecodeRequest;

/// Decodes calldata, revert payloads and logs against the current index.
///
/// Every call takes one snapshot of the index, so a concurrent `reload`
/// never mixes two indexes inside a single decode or batch.
#[derive(Debug, Clone)]
pub struct DecodeEngine {
    index: SharedIndex,
    config: EngineConfig,
}

impl DecodeEngine {
    pub fn new(index: SharedIndex, config: EngineConfig) -> Self {
        Self { index, config }
    }

    /// Install `config.log` as the global subscriber, then load the table
    /// named by `config.table_path` and build the index.
    ///
    /// An already-installed subscriber is kept as is.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        if let Err(err) = abiscope_observability::try_init_tracing(&config.log) {
            debug!(error = %err, "tracing subscriber already installed");
        }
        let path = config
            .table_path
            .clone()
            .ok_or(EngineError::MissingTablePath)?;
        let table = SelectorTable::from_path(&path)?;
        let index = builder(&config).build(&table)?;
        info!(
            path = %path.display(),
            selectors = index.selector_count(),
            collisions = index.collisions().len(),
            "decode engine ready"
        );
        Ok(Self::new(SharedIndex::new(index), config))
    }

    /// The shared index handle; clones of it observe reloads.
    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decode `calldata` into every function candidate that validates.
    ///
    /// Unknown selectors give an empty list. When `selector_hint` is given it
    /// is used for the lookup; a hint that disagrees with the calldata's own
    /// selector matches nothing.
    pub fn decode(
        &self,
        calldata: &[u8],
        selector_hint: Option<Selector>,
        contract_hint: Option<&str>,
    ) -> Result<Vec<Candidate>, EngineError> {
        Ok(self
            .decode_detailed(calldata, selector_hint, contract_hint)?
            .into_matches())
    }

    /// Like [`decode`](Self::decode), keeping the per-candidate rejections.
    pub fn decode_detailed(
        &self,
        calldata: &[u8],
        selector_hint: Option<Selector>,
        contract_hint: Option<&str>,
    ) -> Result<Resolution, EngineError> {
        self.check_size(calldata.len())?;
        let index = self.index.load();
        Ok(resolve_kind(
            &index,
            calldata,
            selector_hint,
            contract_hint,
            EntryKind::Function,
        ))
    }

    /// Decode a revert payload against the custom errors sharing its selector.
    pub fn decode_revert(
        &self,
        data: &[u8],
        contract_hint: Option<&str>,
    ) -> Result<Resolution, EngineError> {
        self.check_size(data.len())?;
        let index = self.index.load();
        Ok(resolve_kind(&index, data, None, contract_hint, EntryKind::Error))
    }

    /// Decode one log against every event whose topic hash equals `topics[0]`.
    ///
    /// Anonymous events carry no topic hash and cannot be found this way.
    pub fn decode_log(
        &self,
        topics: &[[u8; 32]],
        data: &[u8],
    ) -> Result<Vec<DecodedLog>, EngineError> {
        self.check_size(data.len())?;
        let Some(topic0) = topics.first() else {
            return Ok(Vec::new());
        };

        let index = self.index.load();
        let mut logs = Vec::new();
        for entry in index.lookup_event(topic0) {
            match decode_log(topics, data, &entry) {
                Ok(log) => logs.push(log),
                Err(error) => {
                    trace!(candidate = %entry, kind = error.kind(), %error, "event candidate rejected");
                }
            }
        }
        Ok(logs)
    }

    /// Decode many requests in parallel, one result per request in input order.
    ///
    /// Requests are processed in chunks of `batch_chunk_size`; each chunk fans
    /// out over rayon's pool.
    pub fn decode_batch(
        &self,
        requests: &[DecodeRequest],
    ) -> Vec<Result<Vec<Candidate>, EngineError>> {
        let chunk_size = self.config.batch_chunk_size.max(1);
        info!(requests = requests.len(), chunk_size, "decoding batch");

        let index = self.index.load();
        let mut results = Vec::with_capacity(requests.len());
        for chunk in requests.chunks(chunk_size) {
            let decoded: Vec<_> = chunk
                .par_iter()
                .map(|req| -> Result<Vec<Candidate>, EngineError> {
                    self.check_size(req.calldata.len())?;
                    Ok(resolve_kind(
                        &index,
                        &req.calldata,
                        req.selector_hint,
                        req.contract_hint.as_deref(),
                        EntryKind::Function,
                    )
                    .into_matches())
                })
                .collect();
            results.extend(decoded);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        let unresolved = results
            .iter()
            .filter(|r| matches!(r, Ok(c) if c.is_empty()))
            .count();
        info!(requests = requests.len(), failed, unresolved, "batch complete");
        results
    }

    /// Build a new index from `table` and swap it in.
    ///
    /// On error the current index stays in place.
    pub fn reload(&self, table: &SelectorTable) -> Result<IndexReport, EngineError> {
        let index = builder(&self.config).build(table)?;
        let report = index.report().clone();
        let previous = self.index.swap(index);
        info!(
            selectors = report.selectors,
            previous_selectors = previous.selector_count(),
            collisions = report.collisions.len(),
            "index reloaded"
        );
        Ok(report)
    }

    /// Reload from a table file.
    pub fn reload_from_path(&self, path: &Path) -> Result<IndexReport, EngineError> {
        let table = SelectorTable::from_path(path)?;
        self.reload(&table)
    }

    fn check_size(&self, len: usize) -> Result<(), EngineError> {
        if len > self.config.max_calldata_bytes {
            return Err(EngineError::CalldataTooLarge {
                len,
                max: self.config.max_calldata_bytes,
            });
        }
        Ok(())
    }
}

fn builder(config: &EngineConfig) -> IndexBuilder {
    IndexBuilder::new()
        .verify_keys(config.verify_table_keys)
        .skip_invalid(config.skip_invalid_records)
}

/// Look up the candidates of one kind and run the disambiguator over them.
fn resolve_kind(
    index: &SelectorIndex,
    data: &[u8],
    selector_hint: Option<Selector>,
    contract_hint: Option<&str>,
    kind: EntryKind,
) -> Resolution {
    let found = Selector::from_calldata(data);
    let key = match (selector_hint, found) {
        (Some(hint), Some(found)) if hint != found => {
            debug!(hint = %hint, selector = %found, "selector hint disagrees with calldata");
            return Resolution {
                selector: Some(found),
                ..Resolution::default()
            };
        }
        (Some(hint), _) => hint,
        (None, Some(found)) => found,
        (None, None) => return Resolution::default(),
    };

    let candidates: Vec<_> = index
        .lookup(key)
        .into_iter()
        .filter(|e| e.kind == kind)
        .collect();
    if candidates.is_empty() {
        trace!(selector = %key, %kind, "unknown selector");
    }
    resolve(data, &candidates, contract_hint)
}
