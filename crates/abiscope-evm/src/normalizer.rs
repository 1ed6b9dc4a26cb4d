//! Converts alloy `DynSolValue` → abiscope `NormalizedValue`.
//!
//! Tuple members take their names from the ABI components; members without
//! a name fall back to their position ("0", "1", ...).

use abiscope_core::{entry::AbiParam, types::NormalizedValue};
use alloy_core::dyn_abi::DynSolValue;

/// Convert a decoded `DynSolValue` into a `NormalizedValue`.
///
/// `components` are the tuple members of the parameter the value was decoded
/// for; pass `&[]` for non-tuple parameters.
pub fn normalize(val: DynSolValue, components: &[AbiParam]) -> NormalizedValue {
    match val {
        DynSolValue::Bool(b) => NormalizedValue::Bool(b),

        // Narrow to i128/u128 whenever the value fits, whatever the bit width
        DynSolValue::Int(i, _bits) => match i128::try_from(i) {
            Ok(v) => NormalizedValue::Int(v),
            Err(_) => NormalizedValue::BigInt(i.to_string()),
        },

        DynSolValue::Uint(u, _bits) => match u128::try_from(u) {
            Ok(v) => NormalizedValue::Uint(v),
            Err(_) => NormalizedValue::BigUint(u.to_string()),
        },

        DynSolValue::FixedBytes(word, size) => NormalizedValue::Bytes(word[..size].to_vec()),

        DynSolValue::Bytes(b) => NormalizedValue::Bytes(b),

        DynSolValue::String(s) => NormalizedValue::Str(s),

        DynSolValue::Address(a) => NormalizedValue::Address(a.to_checksum(None)),

        DynSolValue::Function(f) => NormalizedValue::Bytes(f.to_vec()),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => NormalizedValue::Array(
            vals.into_iter().map(|v| normalize(v, components)).collect(),
        ),

        DynSolValue::Tuple(fields) => NormalizedValue::Tuple(
            fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let component = components.get(i);
                    let nested = component.map(|c| c.components.as_slice()).unwrap_or(&[]);
                    (member_name(component, i), normalize(v, nested))
                })
                .collect(),
        ),
    }
}

fn member_name(component: Option<&AbiParam>, index: usize) -> String {
    match component {
        Some(c) if !c.name.is_empty() => c.name.clone(),
        _ => index.to_string(),
    }
}
