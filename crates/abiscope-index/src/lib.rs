//! # abiscope-index
//!
//! The selector index: maps every 4-byte selector to all ABI entries that
//! carry it.
//!
//! ## Pipeline
//! 1. **Table**: the static `selector -> { name, abi, functions_names }` data,
//!    parsed without collapsing duplicate keys
//! 2. **Builder**: one pass over the table; every function, error and event
//!    is keyed by its own computed selector, collisions are merged and logged
//! 3. **Index**: immutable once built; share it behind an `Arc`
//! 4. **SharedIndex**: a handle whose index can be replaced atomically on reload
//!
//! The table's top-level key is treated as a weak hint only: it is checked
//! against the record's own selectors and reported when nothing matches.

pub mod abi;
pub mod builder;
pub mod index;
pub mod shared;
pub mod table;

pub use builder::{IndexBuilder, IndexReport};
pub use index::{Collision, ContractRecord, KeyMatch, SelectorIndex};
pub use shared::SharedIndex;
pub use table::{SelectorTable, TableRecord};
