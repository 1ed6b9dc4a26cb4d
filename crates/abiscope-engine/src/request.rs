//! Decode request type.

use abiscope_core::selector::Selector;
use serde::{Deserialize, Serialize};

/// One calldata blob plus optional hints, as accepted by `decode_batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Raw calldata, selector included
    #[serde(with = "hex_bytes")]
    pub calldata: Vec<u8>,
    /// Selector to look up instead of the calldata's first 4 bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_hint: Option<Selector>,
    /// Contract or interface name whose candidates rank first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_hint: Option<String>,
}

impl DecodeRequest {
    pub fn new(calldata: impl Into<Vec<u8>>) -> Self {
        Self {
            calldata: calldata.into(),
            ..Self::default()
        }
    }

    pub fn selector_hint(mut self, selector: Selector) -> Self {
        self.selector_hint = Some(selector);
        self
    }

    pub fn contract_hint(mut self, contract: impl Into<String>) -> Self {
        self.contract_hint = Some(contract.into());
        self
    }
}

/// Calldata as a `0x`-prefixed hex string on the wire.
mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(D::Error::custom)
    }
}
