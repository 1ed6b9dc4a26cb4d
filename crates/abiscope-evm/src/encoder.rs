//! ABI encoder, the inverse of the calldata decoder.
//!
//! Converts `NormalizedValue` arguments into `selector ++ abi_encode_params`.
//!
//! # Usage
//! ```ignore
//! let calldata = encode_call(&transfer_entry, &[
//!     NormalizedValue::Address("0xd8dA...".into()),
//!     NormalizedValue::Uint(1_000_000),
//! ])?;
//! ```

use abiscope_core::{
    entry::{AbiEntry, AbiParam, EntryKind},
    error::EncodeError,
    types::NormalizedValue,
};
use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, I256, U256};
use std::str::FromStr;

/// Encode a function call (or custom-error revert payload) to bytes.
///
/// # Arguments
/// * `entry` - function or error entry; supplies selector and input types
/// * `args` - values in declaration order
pub fn encode_call(entry: &AbiEntry, args: &[NormalizedValue]) -> Result<Vec<u8>, EncodeError> {
    if entry.kind == EntryKind::Event {
        return Err(EncodeError::UnsupportedType {
            ty: entry.signature(),
            reason: "events are emitted as logs, not call data".into(),
        });
    }
    if args.len() != entry.inputs.len() {
        return Err(EncodeError::ArgumentCount {
            entry: entry.to_string(),
            expected: entry.inputs.len(),
            got: args.len(),
        });
    }

    let mut calldata = entry.selector.0.to_vec();
    calldata.extend(encode_args(&entry.inputs, args)?);
    Ok(calldata)
}

/// ABI-encode `args` as a parameter list, without a selector.
pub fn encode_args(inputs: &[AbiParam], args: &[NormalizedValue]) -> Result<Vec<u8>, EncodeError> {
    if inputs.len() != args.len() {
        return Err(EncodeError::InvalidArgument {
            field: "(params)".into(),
            reason: format!("expected {} values, got {}", inputs.len(), args.len()),
        });
    }

    let mut values = Vec::with_capacity(args.len());
    for (i, (param, arg)) in inputs.iter().zip(args).enumerate() {
        let field = if param.name.is_empty() {
            format!("arg{i}")
        } else {
            param.name.clone()
        };
        let ty = DynSolType::parse(&param.ty).map_err(|e| EncodeError::UnsupportedType {
            ty: param.ty.clone(),
            reason: e.to_string(),
        })?;
        let value = normalized_to_dyn_value(arg, &ty)
            .map_err(|reason| EncodeError::InvalidArgument { field, reason })?;
        values.push(value);
    }

    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Convert a `NormalizedValue` to the alloy `DynSolValue` for the given expected type.
pub fn normalized_to_dyn_value(
    val: &NormalizedValue,
    expected: &DynSolType,
) -> Result<DynSolValue, String> {
    match (val, expected) {
        (NormalizedValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),

        (NormalizedValue::Uint(u), DynSolType::Uint(bits)) => uint(U256::from(*u), *bits),
        (NormalizedValue::BigUint(s), DynSolType::Uint(bits)) => {
            let u = U256::from_str(s).map_err(|e| format!("BigUint parse: {e}"))?;
            uint(u, *bits)
        }

        (NormalizedValue::Int(i), DynSolType::Int(bits)) => {
            int(I256::try_from(*i).map_err(|e| e.to_string())?, *bits)
        }
        (NormalizedValue::BigInt(s), DynSolType::Int(bits)) => {
            let i = I256::from_str(s).map_err(|e| format!("BigInt parse: {e}"))?;
            int(i, *bits)
        }

        (NormalizedValue::Address(s), DynSolType::Address) => {
            let addr = Address::from_str(s).map_err(|e| format!("address parse: {e}"))?;
            Ok(DynSolValue::Address(addr))
        }

        (NormalizedValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),

        (NormalizedValue::Bytes(b), DynSolType::FixedBytes(n)) => {
            if b.len() > *n {
                return Err(format!("bytes{n}: got {} bytes", b.len()));
            }
            let mut word = [0u8; 32];
            word[..b.len()].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(B256::from(word), *n))
        }

        (NormalizedValue::Str(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),

        (NormalizedValue::Array(elems), DynSolType::Array(inner)) => {
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| normalized_to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(dyn_elems?))
        }

        (NormalizedValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| normalized_to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(dyn_elems?))
        }

        (NormalizedValue::Tuple(fields), DynSolType::Tuple(types)) => {
            if fields.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    fields.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> = fields
                .iter()
                .zip(types.iter())
                .map(|((_, v), t)| normalized_to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }

        _ => Err(format!(
            "cannot encode {val} as {}",
            expected.sol_type_name()
        )),
    }
}

fn uint(value: U256, bits: usize) -> Result<DynSolValue, String> {
    if bits < 256 && value >> bits != U256::ZERO {
        return Err(format!("{value} does not fit in uint{bits}"));
    }
    Ok(DynSolValue::Uint(value, bits))
}

fn int(value: I256, bits: usize) -> Result<DynSolValue, String> {
    if bits < 256 {
        let word = value.to_be_bytes::<32>();
        let pad = 32 - bits / 8;
        let fill = if word[pad] & 0x80 != 0 { 0xff } else { 0x00 };
        if !word[..pad].iter().all(|b| *b == fill) {
            return Err(format!("{value} does not fit in int{bits}"));
        }
    }
    Ok(DynSolValue::Int(value, bits))
}
