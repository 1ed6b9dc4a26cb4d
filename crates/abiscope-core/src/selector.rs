//! 4-byte function selectors.
//!
//! A selector is `keccak256(signature)[..4]`, e.g.
//!   keccak256("transfer(address,uint256)")[..4] = 0xa9059cbb
//!
//! Selector tables key their records by 8 hex chars without a prefix; both
//! forms are accepted when parsing.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// A 4-byte function, error or (truncated) event selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    #[error("selector must be 8 hex chars, got {len}")]
    BadLength { len: usize },

    #[error("selector is not valid hex: {0}")]
    BadHex(String),
}

impl Selector {
    /// Selector of a canonical signature string such as `"balanceOf(address)"`.
    pub fn from_signature(signature: &str) -> Self {
        let hash = keccak256(signature.as_bytes());
        Self([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Leading 4 bytes of calldata, if present.
    pub fn from_calldata(calldata: &[u8]) -> Option<Self> {
        let head: [u8; 4] = calldata.get(..4)?.try_into().ok()?;
        Some(Self(head))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Table-key form: 8 lowercase hex chars, no prefix.
    pub fn to_key(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Selector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex_part.len() != 8 {
            return Err(SelectorParseError::BadLength { len: hex_part.len() });
        }
        let mut out = [0u8; 4];
        hex::decode_to_slice(hex_part, &mut out)
            .map_err(|e| SelectorParseError::BadHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
