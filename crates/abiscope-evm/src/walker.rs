//! Strict walker over an ABI-encoded parameter tuple.
//!
//! Static members are read inline from the head; dynamic members through a
//! 32-byte offset relative to the start of the enclosing tuple. Every word is
//! validated: dirty padding on `address`, `bool`, `uintN`, `intN`, `bytesN`
//! and `function`, offsets or lengths wider than a machine word, and `string`
//! payloads that are not UTF-8 all fail. Colliding signatures are told apart
//! by exactly these failures.
//!
//! Positions in errors are absolute: `base` is the position of `data[0]` in
//! the caller's buffer (4 for calldata, 0 for log data).
//!
//! Offsets may legally point anywhere in the buffer, including at a region
//! another element already used. The walk therefore carries a budget tied to
//! the buffer size: one unit per decoded value plus one per payload byte
//! copied out of a `bytes`/`string`. A canonical encoding never exceeds it.

use abiscope_core::{entry::AbiParam, error::DecodeError};
use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Function, B256, I256, U256};
use std::cell::Cell;

pub(crate) const WORD: usize = 32;

/// One member of a sequence: its type, the named components of its tuple
/// (if any) and its field path.
pub(crate) type Member<'t> = (&'t DynSolType, &'t [AbiParam], String);

/// Parse a canonical type string.
pub(crate) fn resolve_type(param: &AbiParam, field: &str) -> Result<DynSolType, DecodeError> {
    DynSolType::parse(&param.ty).map_err(|e| DecodeError::UnsupportedType {
        field: field.to_string(),
        ty: param.ty.clone(),
        reason: e.to_string(),
    })
}

pub(crate) fn is_dynamic(ty: &DynSolType) -> bool {
    match ty {
        DynSolType::Bytes | DynSolType::String | DynSolType::Array(_) => true,
        DynSolType::FixedArray(inner, _) => is_dynamic(inner),
        DynSolType::Tuple(types) => types.iter().any(is_dynamic),
        _ => false,
    }
}

/// Types that occupy exactly one word when encoded in place.
pub(crate) fn is_word_type(ty: &DynSolType) -> bool {
    !matches!(
        ty,
        DynSolType::Bytes
            | DynSolType::String
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

/// Bytes a member occupies in the head of its enclosing tuple.
pub(crate) fn head_size(ty: &DynSolType) -> usize {
    if is_dynamic(ty) {
        return WORD;
    }
    match ty {
        DynSolType::FixedArray(inner, len) => head_size(inner).saturating_mul(*len),
        DynSolType::Tuple(types) => types.iter().map(head_size).fold(0, usize::saturating_add),
        _ => WORD,
    }
}

/// Sum of the head sizes of a parameter list.
pub(crate) fn static_head_size(types: &[DynSolType]) -> usize {
    types.iter().map(head_size).fold(0, usize::saturating_add)
}

/// Walk budget for a buffer of `len` bytes.
fn budget_for(len: usize) -> usize {
    len.saturating_mul(2).saturating_add(WORD)
}

pub(crate) struct Walker<'a> {
    data: &'a [u8],
    base: usize,
    budget: Cell<usize>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            base,
            budget: Cell::new(budget_for(data.len())),
        }
    }

    fn abs(&self, pos: usize) -> usize {
        self.base.saturating_add(pos)
    }

    /// Spend `units` of the walk budget on the value at `pos`.
    fn charge(&self, units: usize, pos: usize, ty: &DynSolType, path: &str) -> Result<(), DecodeError> {
        match self.budget.get().checked_sub(units) {
            Some(left) => {
                self.budget.set(left);
                Ok(())
            }
            None => Err(DecodeError::InvalidValue {
                field: path.to_string(),
                ty: ty.sol_type_name().into_owned(),
                at: self.abs(pos),
                reason: format!(
                    "decoded size exceeds the {}-byte buffer; offsets reuse the same region",
                    self.data.len()
                ),
            }),
        }
    }

    /// Decode the members of a tuple whose head starts at `start`.
    pub(crate) fn sequence<'t>(
        &self,
        start: usize,
        members: impl Iterator<Item = Member<'t>>,
    ) -> Result<Vec<DynSolValue>, DecodeError> {
        let mut head = start;
        let mut values = Vec::new();
        for (ty, components, path) in members {
            let at = if is_dynamic(ty) {
                self.offset(start, head, &path)?
            } else {
                head
            };
            values.push(self.value(at, ty, components, &path)?);
            head = head.saturating_add(head_size(ty));
        }
        Ok(values)
    }

    /// Decode one value located at `pos`.
    pub(crate) fn value<'t>(
        &self,
        pos: usize,
        ty: &'t DynSolType,
        components: &'t [AbiParam],
        path: &str,
    ) -> Result<DynSolValue, DecodeError> {
        self.charge(1, pos, ty, path)?;
        match ty {
            DynSolType::Bytes => Ok(DynSolValue::Bytes(self.byte_run(pos, ty, path)?.to_vec())),

            DynSolType::String => {
                let raw = self.byte_run(pos, ty, path)?;
                let s = std::str::from_utf8(raw).map_err(|e| DecodeError::InvalidValue {
                    field: path.to_string(),
                    ty: "string".into(),
                    at: self.abs(pos + WORD),
                    reason: format!("invalid UTF-8: {e}"),
                })?;
                Ok(DynSolValue::String(s.to_owned()))
            }

            DynSolType::Array(inner) => {
                let len = self.length(pos, path)?;
                let start = pos + WORD;
                let available = self.data.len().saturating_sub(start);
                // each element takes at least one byte; refuse before allocating
                let fits = len
                    .checked_mul(head_size(inner).max(1))
                    .is_some_and(|needed| needed <= available);
                if !fits {
                    return Err(DecodeError::LengthOutOfBounds {
                        field: path.to_string(),
                        at: self.abs(pos),
                        length: len.to_string(),
                        available,
                    });
                }
                let inner: &'t DynSolType = inner;
                let members = (0..len).map(move |i| (inner, components, format!("{path}[{i}]")));
                Ok(DynSolValue::Array(self.sequence(start, members)?))
            }

            DynSolType::FixedArray(inner, len) => {
                let inner: &'t DynSolType = inner;
                let members = (0..*len).map(move |i| (inner, components, format!("{path}[{i}]")));
                Ok(DynSolValue::FixedArray(self.sequence(pos, members)?))
            }

            DynSolType::Tuple(types) => {
                let members = types.iter().enumerate().map(move |(i, t)| {
                    let component = components.get(i);
                    let name = component
                        .map(|c| c.name.as_str())
                        .filter(|n| !n.is_empty())
                        .map(str::to_owned)
                        .unwrap_or_else(|| i.to_string());
                    let nested = component.map(|c| c.components.as_slice()).unwrap_or(&[]);
                    (t, nested, format!("{path}.{name}"))
                });
                Ok(DynSolValue::Tuple(self.sequence(pos, members)?))
            }

            _ => self.scalar(pos, ty, path),
        }
    }

    fn word(&self, pos: usize, path: &str) -> Result<&'a [u8; WORD], DecodeError> {
        pos.checked_add(WORD)
            .and_then(|end| self.data.get(pos..end))
            .and_then(|slice| <&[u8; WORD]>::try_from(slice).ok())
            .ok_or_else(|| DecodeError::OffsetOutOfBounds {
                field: path.to_string(),
                at: self.abs(pos),
                offset: pos.to_string(),
                available: self.data.len(),
            })
    }

    /// Follow the offset stored at `head`; offsets count from `start`.
    fn offset(&self, start: usize, head: usize, path: &str) -> Result<usize, DecodeError> {
        let word = self.word(head, path)?;
        let offset = word_to_usize(word).ok_or_else(|| DecodeError::InvalidValue {
            field: path.to_string(),
            ty: "offset".into(),
            at: self.abs(head),
            reason: format!("{} does not fit in a machine word", U256::from_be_bytes(*word)),
        })?;
        start
            .checked_add(offset)
            .filter(|target| target.checked_add(WORD).is_some_and(|end| end <= self.data.len()))
            .ok_or_else(|| DecodeError::OffsetOutOfBounds {
                field: path.to_string(),
                at: self.abs(head),
                offset: offset.to_string(),
                available: self.data.len().saturating_sub(start),
            })
    }

    fn length(&self, pos: usize, path: &str) -> Result<usize, DecodeError> {
        let word = self.word(pos, path)?;
        word_to_usize(word).ok_or_else(|| DecodeError::InvalidValue {
            field: path.to_string(),
            ty: "length".into(),
            at: self.abs(pos),
            reason: format!("{} does not fit in a machine word", U256::from_be_bytes(*word)),
        })
    }

    /// Length-prefixed payload of a `bytes` or `string` value.
    fn byte_run(&self, pos: usize, ty: &DynSolType, path: &str) -> Result<&'a [u8], DecodeError> {
        let len = self.length(pos, path)?;
        let start = pos + WORD;
        let available = self.data.len().saturating_sub(start);
        if len > available {
            return Err(DecodeError::LengthOutOfBounds {
                field: path.to_string(),
                at: self.abs(pos),
                length: len.to_string(),
                available,
            });
        }
        self.charge(len, pos, ty, path)?;
        Ok(&self.data[start..start + len])
    }

    fn scalar(&self, pos: usize, ty: &DynSolType, path: &str) -> Result<DynSolValue, DecodeError> {
        let word = self.word(pos, path)?;
        let invalid = |reason: &str| DecodeError::InvalidValue {
            field: path.to_string(),
            ty: ty.sol_type_name().into_owned(),
            at: self.abs(pos),
            reason: reason.to_string(),
        };

        match ty {
            DynSolType::Bool => {
                if !all_zero(&word[..WORD - 1]) || word[WORD - 1] > 1 {
                    return Err(invalid("expected 0 or 1"));
                }
                Ok(DynSolValue::Bool(word[WORD - 1] == 1))
            }
            DynSolType::Address => {
                if !all_zero(&word[..12]) {
                    return Err(invalid("dirty high-order padding"));
                }
                Ok(DynSolValue::Address(Address::from_slice(&word[12..])))
            }
            DynSolType::Uint(bits) => {
                let pad = WORD - bits / 8;
                if !all_zero(&word[..pad]) {
                    return Err(invalid("dirty high-order padding"));
                }
                Ok(DynSolValue::Uint(U256::from_be_bytes(*word), *bits))
            }
            DynSolType::Int(bits) => {
                let pad = WORD - bits / 8;
                let fill = if pad < WORD && word[pad] & 0x80 != 0 { 0xff } else { 0x00 };
                if !word[..pad].iter().all(|b| *b == fill) {
                    return Err(invalid("not sign-extended"));
                }
                Ok(DynSolValue::Int(I256::from_be_bytes::<WORD>(*word), *bits))
            }
            DynSolType::FixedBytes(size) => {
                if !all_zero(&word[*size..]) {
                    return Err(invalid("dirty low-order padding"));
                }
                Ok(DynSolValue::FixedBytes(B256::from(*word), *size))
            }
            DynSolType::Function => {
                if !all_zero(&word[24..]) {
                    return Err(invalid("dirty low-order padding"));
                }
                Ok(DynSolValue::Function(Function::from_slice(&word[..24])))
            }
            other => Err(DecodeError::UnsupportedType {
                field: path.to_string(),
                ty: other.sol_type_name().into_owned(),
                reason: "not a single-word type".into(),
            }),
        }
    }
}

fn all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

fn word_to_usize(word: &[u8; WORD]) -> Option<usize> {
    if !all_zero(&word[..WORD - 8]) {
        return None;
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail)).ok()
}
