//! The read-only lookup interface the decoder side depends on.
//! Concrete implementations live in `abiscope-index`.

use crate::entry::AbiEntry;
use crate::selector::Selector;
use std::sync::Arc;

/// A thread-safe, read-only view of a selector index.
pub trait SelectorLookup: Send + Sync {
    /// All entries whose own selector equals `selector`, in table declaration
    /// order. Unknown selectors return an empty list.
    fn lookup(&self, selector: Selector) -> Vec<Arc<AbiEntry>>;

    /// Event entries whose full topic hash equals `topic0`.
    fn lookup_event(&self, topic0: &[u8; 32]) -> Vec<Arc<AbiEntry>>;

    /// Number of distinct selectors held.
    fn selector_count(&self) -> usize;
}
