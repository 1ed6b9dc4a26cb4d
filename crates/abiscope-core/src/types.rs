//! Decoded value model.
//!
//! Decoded ABI values are normalized into a small, serializable type system so
//! consumers never handle alloy's dynamic value types directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded, normalized argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    Uint(u128),
    /// Uints that do not fit in u128, as a decimal string
    BigUint(String),
    Int(i128),
    /// Ints that do not fit in i128, as a decimal string
    BigInt(String),
    Bool(bool),
    /// `bytes`, `bytesN` and `function` values
    Bytes(Vec<u8>),
    Str(String),
    /// 20-byte address, 0x-prefixed, EIP-55 checksummed
    Address(String),
    Array(Vec<NormalizedValue>),
    Tuple(Vec<(String, NormalizedValue)>),
}

impl NormalizedValue {
    /// Returns the inner string if this is an Address value.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            NormalizedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Coerce to a u128 if this is a small Uint.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            NormalizedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            NormalizedValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up a tuple member by name.
    pub fn field(&self, name: &str) -> Option<&NormalizedValue> {
        match self {
            NormalizedValue::Tuple(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Uint(v) => write!(f, "{v}"),
            NormalizedValue::BigUint(v) => write!(f, "{v}"),
            NormalizedValue::Int(v) => write!(f, "{v}"),
            NormalizedValue::BigInt(v) => write!(f, "{v}"),
            NormalizedValue::Bool(v) => write!(f, "{v}"),
            NormalizedValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            NormalizedValue::Str(s) => write!(f, "{s:?}"),
            NormalizedValue::Address(a) => write!(f, "{a}"),
            NormalizedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            NormalizedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nested() {
        let v = NormalizedValue::Tuple(vec![
            ("to".into(), NormalizedValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into())),
            (
                "ids".into(),
                NormalizedValue::Array(vec![NormalizedValue::Uint(1), NormalizedValue::Uint(2)]),
            ),
            ("data".into(), NormalizedValue::Bytes(vec![0xde, 0xad])),
        ]);
        assert_eq!(
            v.to_string(),
            "{to: 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045, ids: [1, 2], data: 0xdead}"
        );
    }

    #[test]
    fn tuple_field_lookup() {
        let v = NormalizedValue::Tuple(vec![("amount".into(), NormalizedValue::Uint(7))]);
        assert_eq!(v.field("amount").and_then(|x| x.as_u128()), Some(7));
        assert!(v.field("missing").is_none());
        assert!(NormalizedValue::Bool(true).field("amount").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let val = NormalizedValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into());
        let json = serde_json::to_string(&val).unwrap();
        let back: NormalizedValue = serde_json::from_str(&json).unwrap();
        assert_eq!(val, back);
    }
}
