//! Types for decoded calls and disambiguation results.

use crate::entry::AbiEntry;
use crate::error::DecodeError;
use crate::selector::Selector;
use crate::types::NormalizedValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of decoding one calldata blob against one ABI entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// First 4 bytes of the calldata
    pub selector: Selector,
    /// The entry the arguments were decoded against
    pub entry: Arc<AbiEntry>,
    /// Decoded arguments in declaration order
    pub arguments: Vec<(String, NormalizedValue)>,
}

impl DecodedCall {
    /// Look up a decoded argument by name
    pub fn argument(&self, name: &str) -> Option<&NormalizedValue> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Argument values without their names, in declaration order.
    pub fn values(&self) -> Vec<&NormalizedValue> {
        self.arguments.iter().map(|(_, v)| v).collect()
    }

    /// e.g. `ERC20.transfer(to=0x..., amount=1000000)`
    pub fn summary(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect();
        format!("{}.{}({})", self.entry.contract, self.entry.name, args.join(", "))
    }
}

/// A candidate that decoded successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub entry: Arc<AbiEntry>,
    pub call: DecodedCall,
    /// Whether the entry's contract matched the caller's contract-type hint
    pub hint_match: bool,
}

/// A candidate that failed to decode, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub entry: Arc<AbiEntry>,
    pub error: DecodeError,
}

/// Full outcome of resolving one calldata blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Calldata selector; `None` when the calldata was shorter than 4 bytes
    pub selector: Option<Selector>,
    /// Successful candidates, best first
    pub matches: Vec<Candidate>,
    /// Candidates eliminated by the head-size check or a decode failure
    pub rejected: Vec<Rejection>,
}

impl Resolution {
    /// True when exactly one candidate survived.
    pub fn is_unambiguous(&self) -> bool {
        self.matches.len() == 1
    }

    /// The single surviving candidate, if there is exactly one.
    pub fn unique(&self) -> Option<&Candidate> {
        if self.is_unambiguous() {
            self.matches.first()
        } else {
            None
        }
    }

    pub fn into_matches(self) -> Vec<Candidate> {
        self.matches
    }
}

/// An event log decoded against one event entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedLog {
    pub entry: Arc<AbiEntry>,
    /// Parameters in declaration order, indexed and non-indexed interleaved.
    /// Indexed dynamic parameters hold the 32-byte topic hash as `Bytes`.
    pub arguments: Vec<(String, NormalizedValue)>,
}

impl DecodedLog {
    pub fn argument(&self, name: &str) -> Option<&NormalizedValue> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}
