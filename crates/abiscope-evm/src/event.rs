//! Event log decoding.
//!
//! - `topics[0]` is the event's topic hash (absent for anonymous events)
//! - `topics[1..]` hold indexed parameters, one word each; indexed
//!   strings, bytes, arrays and tuples are stored as their keccak hash and
//!   come back as 32 raw bytes
//! - `data` holds the non-indexed parameters as an ABI-encoded tuple

use abiscope_core::{
    call::DecodedLog,
    entry::{AbiEntry, AbiParam, EntryKind},
    error::DecodeError,
    types::NormalizedValue,
};
use alloy_core::dyn_abi::DynSolType;
use std::sync::Arc;

use crate::decoder::resolve_inputs;
use crate::normalizer::normalize;
use crate::walker::{self, Walker};

/// Decode one log against an event entry.
pub fn decode_log(
    topics: &[[u8; 32]],
    data: &[u8],
    entry: &Arc<AbiEntry>,
) -> Result<DecodedLog, DecodeError> {
    if entry.kind != EntryKind::Event {
        return Err(DecodeError::WrongKind {
            entry: entry.to_string(),
            kind: entry.kind.to_string(),
        });
    }

    let indexed = entry.inputs.iter().filter(|p| p.indexed).count();
    let expected = indexed + usize::from(!entry.anonymous);
    if topics.len() != expected {
        return Err(DecodeError::InvalidTopics {
            reason: format!("{entry} expects {expected} topics, got {}", topics.len()),
        });
    }

    let mut topics = topics.iter();
    if !entry.anonymous {
        let topic0 = topics.next();
        if topic0 != entry.topic0.as_ref() {
            return Err(DecodeError::InvalidTopics {
                reason: format!(
                    "topic0 0x{} is not the hash of {}",
                    topic0.map(hex::encode).unwrap_or_default(),
                    entry.signature()
                ),
            });
        }
    }

    let names = entry.input_names();
    let types = resolve_inputs(&entry.inputs, &names)?;

    // non-indexed members, in order, decoded from `data`
    let body: Vec<(&DynSolType, &AbiParam, &String)> = types
        .iter()
        .zip(&entry.inputs)
        .zip(&names)
        .filter(|((_, p), _)| !p.indexed)
        .map(|((t, p), n)| (t, p, n))
        .collect();
    let body_types: Vec<DynSolType> = body.iter().map(|(t, _, _)| (*t).clone()).collect();
    let needed = walker::static_head_size(&body_types);
    if data.len() < needed {
        return Err(DecodeError::TruncatedHead {
            entry: entry.to_string(),
            needed,
            got: data.len(),
        });
    }
    let members = body
        .iter()
        .map(|(t, p, n)| (*t, p.components.as_slice(), (*n).clone()));
    let mut body_values = Walker::new(data, 0).sequence(0, members)?.into_iter();

    let mut arguments = Vec::with_capacity(entry.inputs.len());
    for ((ty, param), name) in types.iter().zip(&entry.inputs).zip(&names) {
        let value = if param.indexed {
            // topic count was checked above
            let Some(topic) = topics.next() else {
                return Err(DecodeError::InvalidTopics {
                    reason: format!("missing topic for {name}"),
                });
            };
            if walker::is_word_type(ty) {
                let raw = Walker::new(topic, 0).value(0, ty, &[], name)?;
                normalize(raw, &[])
            } else {
                NormalizedValue::Bytes(topic.to_vec())
            }
        } else {
            let Some(raw) = body_values.next() else {
                return Err(DecodeError::InvalidTopics {
                    reason: format!("missing data value for {name}"),
                });
            };
            normalize(raw, &param.components)
        };
        arguments.push((name.clone(), value));
    }

    Ok(DecodedLog {
        entry: entry.clone(),
        arguments,
    })
}
