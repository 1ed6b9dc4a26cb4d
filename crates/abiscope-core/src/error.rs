//! Error types for the abiscope decode pipeline.

use crate::selector::Selector;
use thiserror::Error;

/// Errors from decoding one calldata blob against one ABI entry.
///
/// Positions (`at`) are absolute byte offsets into the full calldata,
/// selector included. `field` is a path such as `orders[1].data`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("calldata too short: {len} bytes (need at least 4 for selector)")]
    MissingSelector { len: usize },

    #[error("selector mismatch: calldata starts with {found}, {entry} expects {expected}")]
    SelectorMismatch {
        expected: Selector,
        found: Selector,
        entry: String,
    },

    #[error("truncated calldata for {entry}: static head needs {needed} bytes, got {got}")]
    TruncatedHead {
        entry: String,
        needed: usize,
        got: usize,
    },

    #[error("offset out of bounds for {field} at byte {at}: points to {offset}, only {available} bytes available")]
    OffsetOutOfBounds {
        field: String,
        at: usize,
        offset: String,
        available: usize,
    },

    #[error("length out of bounds for {field} at byte {at}: declares {length}, only {available} bytes available")]
    LengthOutOfBounds {
        field: String,
        at: usize,
        length: String,
        available: usize,
    },

    #[error("invalid {ty} value for {field} at byte {at}: {reason}")]
    InvalidValue {
        field: String,
        ty: String,
        at: usize,
        reason: String,
    },

    #[error("unsupported ABI type '{ty}' for {field}: {reason}")]
    UnsupportedType {
        field: String,
        ty: String,
        reason: String,
    },

    #[error("entry {entry} is a {kind}, not decodable here")]
    WrongKind { entry: String, kind: String },

    #[error("invalid event topics: {reason}")]
    InvalidTopics { reason: String },
}

impl DecodeError {
    /// Short machine-readable tag, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::MissingSelector { .. } => "missing_selector",
            DecodeError::SelectorMismatch { .. } => "selector_mismatch",
            DecodeError::TruncatedHead { .. } => "truncated_head",
            DecodeError::OffsetOutOfBounds { .. } => "offset_out_of_bounds",
            DecodeError::LengthOutOfBounds { .. } => "length_out_of_bounds",
            DecodeError::InvalidValue { .. } => "invalid_value",
            DecodeError::UnsupportedType { .. } => "unsupported_type",
            DecodeError::WrongKind { .. } => "wrong_kind",
            DecodeError::InvalidTopics { .. } => "invalid_topics",
        }
    }
}

/// Errors from encoding normalized values into calldata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("argument count mismatch: {entry} takes {expected}, got {got}")]
    ArgumentCount {
        entry: String,
        expected: usize,
        got: usize,
    },

    #[error("argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("unsupported ABI type '{ty}': {reason}")]
    UnsupportedType { ty: String, reason: String },
}

/// Errors from loading a selector table or building an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid selector table: {reason}")]
    InvalidTable { reason: String },

    #[error("invalid table key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid ABI for contract '{contract}' (key {key}): {reason}")]
    InvalidAbi {
        contract: String,
        key: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
