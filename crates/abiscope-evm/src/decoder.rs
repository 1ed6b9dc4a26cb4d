//! Calldata decoder.
//!
//! Decodes `selector ++ abi_encode_params(inputs)` against one ABI entry.
//!
//! # How it works
//! - First 4 bytes of calldata must equal the entry's selector
//! - The payload must cover the static head of the input tuple
//! - Inputs are walked per the ABI tuple rules with strict word validation
//!
//! Custom-error revert data has the same layout, so error entries decode here
//! too.

use abiscope_core::{
    call::DecodedCall,
    entry::{AbiEntry, AbiParam, EntryKind},
    error::DecodeError,
    selector::Selector,
};
use alloy_core::dyn_abi::DynSolType;
use std::sync::Arc;

use crate::normalizer::normalize;
use crate::walker::{self, Walker};

pub const SELECTOR_LEN: usize = 4;

/// Decode calldata against a function or error entry.
///
/// # Errors
/// - `MissingSelector` when calldata is shorter than 4 bytes
/// - `SelectorMismatch` when the leading 4 bytes are not the entry's selector
/// - `TruncatedHead` when the payload cannot hold the static head
/// - `OffsetOutOfBounds` / `LengthOutOfBounds` / `InvalidValue` from the walk
pub fn decode(calldata: &[u8], entry: &Arc<AbiEntry>) -> Result<DecodedCall, DecodeError> {
    if entry.kind == EntryKind::Event {
        return Err(wrong_kind(entry));
    }

    let found = Selector::from_calldata(calldata).ok_or(DecodeError::MissingSelector {
        len: calldata.len(),
    })?;
    if found != entry.selector {
        return Err(DecodeError::SelectorMismatch {
            expected: entry.selector,
            found,
            entry: entry.to_string(),
        });
    }

    let payload = &calldata[SELECTOR_LEN..];
    let names = entry.input_names();
    let types = resolve_inputs(&entry.inputs, &names)?;

    let needed = walker::static_head_size(&types);
    if payload.len() < needed {
        return Err(DecodeError::TruncatedHead {
            entry: entry.to_string(),
            needed,
            got: payload.len(),
        });
    }

    let members = types
        .iter()
        .zip(&entry.inputs)
        .zip(&names)
        .map(|((ty, param), name)| (ty, param.components.as_slice(), name.clone()));
    let values = Walker::new(payload, SELECTOR_LEN).sequence(0, members)?;

    let arguments = names
        .into_iter()
        .zip(values)
        .zip(&entry.inputs)
        .map(|((name, value), param)| (name, normalize(value, &param.components)))
        .collect();

    Ok(DecodedCall {
        selector: found,
        entry: entry.clone(),
        arguments,
    })
}

/// Decode custom-error revert data (`selector ++ args`) against an error entry.
pub fn decode_error_data(data: &[u8], entry: &Arc<AbiEntry>) -> Result<DecodedCall, DecodeError> {
    if entry.kind != EntryKind::Error {
        return Err(wrong_kind(entry));
    }
    decode(data, entry)
}

/// Bytes the static head of `inputs` occupies after the selector.
pub fn static_head_size(inputs: &[AbiParam]) -> Result<usize, DecodeError> {
    let types = inputs
        .iter()
        .enumerate()
        .map(|(i, p)| walker::resolve_type(p, &field_name(p, i)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(walker::static_head_size(&types))
}

pub(crate) fn resolve_inputs(
    inputs: &[AbiParam],
    names: &[String],
) -> Result<Vec<DynSolType>, DecodeError> {
    inputs
        .iter()
        .zip(names)
        .map(|(p, name)| walker::resolve_type(p, name))
        .collect()
}

fn field_name(param: &AbiParam, index: usize) -> String {
    if param.name.is_empty() {
        format!("arg{index}")
    } else {
        param.name.clone()
    }
}

fn wrong_kind(entry: &AbiEntry) -> DecodeError {
    DecodeError::WrongKind {
        entry: entry.to_string(),
        kind: entry.kind.to_string(),
    }
}
