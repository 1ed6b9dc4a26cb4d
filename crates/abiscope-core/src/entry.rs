//! The ABI entry model: one function, event or error fragment of a
//! contract's ABI, tagged with the contract that declares it.

use crate::selector::{keccak256, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of ABI fragment an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Function,
    Event,
    Error,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Function => "function",
            EntryKind::Event => "event",
            EntryKind::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// A single input or output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name (may be empty in the source ABI)
    pub name: String,
    /// Canonical Solidity type with tuples expanded, e.g. `(address,uint256)[]`
    pub ty: String,
    /// Event parameters only: stored in a topic rather than the data payload
    #[serde(default)]
    pub indexed: bool,
    /// Named members when `ty` is a tuple or an array of tuples
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            indexed: false,
            components: Vec::new(),
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn with_components(mut self, components: Vec<AbiParam>) -> Self {
        self.components = components;
        self
    }

    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with('(')
    }
}

/// One ABI fragment. Immutable once loaded into an index.
///
/// The selector is always computed from the entry's own canonical signature,
/// never copied from a table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiEntry {
    /// Declaring contract or interface, e.g. "ERC20PresetMinterPauser"
    pub contract: String,
    /// Fragment name, e.g. "balanceOf"
    pub name: String,
    pub kind: EntryKind,
    /// `keccak256(signature)[..4]`; for events the truncated topic hash
    pub selector: Selector,
    /// Events only: full `keccak256(signature)`
    #[serde(default, skip_serializing_if = "Option::is_none", with = "topic_hex")]
    pub topic0: Option<[u8; 32]>,
    /// Events only
    #[serde(default)]
    pub anonymous: bool,
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

impl AbiEntry {
    pub fn function(
        contract: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
    ) -> Self {
        Self::build(contract.into(), name.into(), EntryKind::Function, inputs, outputs)
    }

    pub fn error(
        contract: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<AbiParam>,
    ) -> Self {
        Self::build(contract.into(), name.into(), EntryKind::Error, inputs, Vec::new())
    }

    pub fn event(
        contract: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<AbiParam>,
        anonymous: bool,
    ) -> Self {
        let mut entry =
            Self::build(contract.into(), name.into(), EntryKind::Event, inputs, Vec::new());
        entry.anonymous = anonymous;
        entry.topic0 = Some(keccak256(entry.signature().as_bytes()));
        entry
    }

    fn build(
        contract: String,
        name: String,
        kind: EntryKind,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
    ) -> Self {
        let signature = canonical_signature(&name, &inputs);
        Self {
            contract,
            name,
            kind,
            selector: Selector::from_signature(&signature),
            topic0: None,
            anonymous: false,
            inputs,
            outputs,
            state_mutability: None,
        }
    }

    pub fn with_state_mutability(mut self, mutability: impl Into<String>) -> Self {
        self.state_mutability = Some(mutability.into());
        self
    }

    /// Canonical signature, e.g. `"transfer(address,uint256)"`.
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Input names in declaration order; unnamed inputs become `arg{i}`.
    pub fn input_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.name.is_empty() {
                    format!("arg{i}")
                } else {
                    p.name.clone()
                }
            })
            .collect()
    }

    /// Same fragment declared by the same contract.
    pub fn same_declaration(&self, other: &AbiEntry) -> bool {
        self.kind == other.kind
            && self.contract == other.contract
            && self.signature() == other.signature()
    }
}

impl fmt::Display for AbiEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.contract, self.signature())
    }
}

fn canonical_signature(name: &str, inputs: &[AbiParam]) -> String {
    let types: Vec<&str> = inputs.iter().map(|p| p.ty.as_str()).collect();
    format!("{name}({})", types.join(","))
}

mod topic_hex {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(topic: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
        match topic {
            Some(t) => s.serialize_str(&format!("0x{}", hex::encode(t))),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
        let Some(s) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut out).map_err(de::Error::custom)?;
        Ok(Some(out))
    }
}
