//! # abiscope-core
//!
//! Core types shared across all abiscope crates: the ABI entry model, the
//! 4-byte `Selector`, decoded call/value types, the error taxonomy and the
//! `SelectorLookup` trait every index implements.

pub mod call;
pub mod entry;
pub mod error;
pub mod lookup;
pub mod selector;
pub mod types;

pub use call::{Candidate, DecodedCall, DecodedLog, Rejection, Resolution};
pub use entry::{AbiEntry, AbiParam, EntryKind};
pub use error::{DecodeError, EncodeError, IndexError};
pub use lookup::SelectorLookup;
pub use selector::{keccak256, Selector, SelectorParseError};
pub use types::NormalizedValue;
