//! Candidate resolution for colliding selectors.
//!
//! Policy:
//! 1. Candidates whose selector differs from the calldata are dropped
//!    silently; event entries are never calldata candidates.
//! 2. Candidates whose static head does not fit the payload are eliminated
//!    without decoding.
//! 3. The rest are decoded in index order. A failure is recorded against
//!    its candidate and never aborts the others.
//! 4. Candidates declared by the hinted contract come first; everything else
//!    keeps declaration order. Nothing is guessed: every survivor is returned.

use abiscope_core::{
    call::{Candidate, Rejection, Resolution},
    entry::{AbiEntry, EntryKind},
    error::DecodeError,
    selector::Selector,
};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::decoder::{self, SELECTOR_LEN};

/// Resolve `calldata` against `candidates`.
///
/// `contract_hint` is compared ASCII case-insensitively with each entry's
/// declaring contract.
pub fn resolve(
    calldata: &[u8],
    candidates: &[Arc<AbiEntry>],
    contract_hint: Option<&str>,
) -> Resolution {
    let Some(selector) = Selector::from_calldata(calldata) else {
        let rejected = candidates
            .iter()
            .filter(|e| e.kind != EntryKind::Event)
            .map(|entry| Rejection {
                entry: entry.clone(),
                error: DecodeError::MissingSelector { len: calldata.len() },
            })
            .collect();
        return Resolution {
            selector: None,
            matches: Vec::new(),
            rejected,
        };
    };

    let payload_len = calldata.len() - SELECTOR_LEN;
    let mut rejected = Vec::new();
    let mut survivors = Vec::with_capacity(candidates.len());

    for entry in candidates {
        if entry.kind == EntryKind::Event || entry.selector != selector {
            trace!(selector = %selector, candidate = %entry, "dropping non-matching candidate");
            continue;
        }
        match decoder::static_head_size(&entry.inputs) {
            Ok(needed) if needed > payload_len => rejected.push(Rejection {
                entry: entry.clone(),
                error: DecodeError::TruncatedHead {
                    entry: entry.to_string(),
                    needed,
                    got: payload_len,
                },
            }),
            Ok(_) => survivors.push(entry),
            Err(error) => rejected.push(Rejection {
                entry: entry.clone(),
                error,
            }),
        }
    }

    let mut hinted = Vec::new();
    let mut others = Vec::new();
    for entry in survivors {
        match decoder::decode(calldata, entry) {
            Ok(call) => {
                let hint_match =
                    contract_hint.is_some_and(|hint| entry.contract.eq_ignore_ascii_case(hint));
                let candidate = Candidate {
                    entry: entry.clone(),
                    call,
                    hint_match,
                };
                if hint_match {
                    hinted.push(candidate);
                } else {
                    others.push(candidate);
                }
            }
            Err(error) => {
                trace!(candidate = %entry, kind = error.kind(), %error, "candidate rejected");
                rejected.push(Rejection {
                    entry: entry.clone(),
                    error,
                });
            }
        }
    }
    hinted.append(&mut others);

    debug!(
        selector = %selector,
        candidates = candidates.len(),
        matches = hinted.len(),
        rejected = rejected.len(),
        "calldata resolved"
    );

    Resolution {
        selector: Some(selector),
        matches: hinted,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiscope_core::{entry::AbiParam, types::NormalizedValue};

    fn entry(contract: &str, name: &str, types: &[&str]) -> Arc<AbiEntry> {
        let inputs = types
            .iter()
            .enumerate()
            .map(|(i, t)| AbiParam::new(format!("p{i}"), *t))
            .collect();
        Arc::new(AbiEntry::function(contract, name, inputs, vec![]))
    }

    /// Real signatures sharing selector 0xa9059cbb.
    fn a9059cbb() -> Vec<Arc<AbiEntry>> {
        let entries = vec![
            entry("ERC20", "transfer", &["address", "uint256"]),
            entry("WorkMock", "workMyDirefulOwner", &["uint256", "uint256"]),
            entry("BytesMock", "func_2093253501", &["bytes"]),
            entry("BabbageMock", "many_msg_babbage", &["bytes1"]),
            entry("JoinMock", "join_tg_invmru_haha_fd06787", &["address", "bool"]),
        ];
        for e in &entries {
            assert_eq!(e.selector.to_key(), "a9059cbb", "{e}");
        }
        entries
    }

    fn transfer_calldata(amount: u8) -> Vec<u8> {
        let mut data = hex::decode("a9059cbb").unwrap();
        data.extend(hex::decode("000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap());
        let mut word = [0u8; 32];
        word[31] = amount;
        data.extend(word);
        data
    }

    fn names(res: &Resolution) -> Vec<&str> {
        res.matches.iter().map(|c| c.entry.name.as_str()).collect()
    }

    #[test]
    fn strict_validation_eliminates_colliders() {
        let res = resolve(&transfer_calldata(100), &a9059cbb(), None);
        assert_eq!(names(&res), vec!["transfer", "workMyDirefulOwner"]);
        assert_eq!(res.rejected.len(), 3);
        assert!(res.matches.iter().all(|c| !c.hint_match));
        assert!(!res.is_unambiguous());
        assert_eq!(
            res.matches[0].call.argument("p1"),
            Some(&NormalizedValue::Uint(100))
        );
    }

    #[test]
    fn bool_shaped_amount_keeps_third_candidate() {
        let res = resolve(&transfer_calldata(1), &a9059cbb(), None);
        assert_eq!(
            names(&res),
            vec!["transfer", "workMyDirefulOwner", "join_tg_invmru_haha_fd06787"]
        );
    }

    #[test]
    fn hint_ranks_first_case_insensitively() {
        let res = resolve(&transfer_calldata(100), &a9059cbb(), Some("workmock"));
        assert_eq!(names(&res), vec!["workMyDirefulOwner", "transfer"]);
        assert!(res.matches[0].hint_match);
        assert!(!res.matches[1].hint_match);
    }

    #[test]
    fn unmatched_hint_keeps_declaration_order() {
        let res = resolve(&transfer_calldata(100), &a9059cbb(), Some("Uniswap"));
        assert_eq!(names(&res), vec!["transfer", "workMyDirefulOwner"]);
    }

    #[test]
    fn short_payload_eliminates_by_head_size() {
        let data = &transfer_calldata(100)[..4 + 32];
        let res = resolve(data, &a9059cbb(), None);
        assert!(res.matches.is_empty());
        assert_eq!(res.rejected.len(), 5);
        let truncated = res
            .rejected
            .iter()
            .filter(|r| matches!(r.error, DecodeError::TruncatedHead { .. }))
            .count();
        assert_eq!(truncated, 3);
    }

    #[test]
    fn missing_selector_rejects_every_candidate() {
        let res = resolve(&[0xa9, 0x05], &a9059cbb(), None);
        assert!(res.selector.is_none());
        assert!(res.matches.is_empty());
        assert!(res
            .rejected
            .iter()
            .all(|r| r.error == DecodeError::MissingSelector { len: 2 }));
    }

    #[test]
    fn mismatched_and_event_candidates_are_dropped_silently() {
        let mut candidates = vec![entry("ERC20", "balanceOf", &["address"])];
        candidates.push(Arc::new(AbiEntry::event(
            "ERC20",
            "Transfer",
            vec![AbiParam::new("from", "address").indexed()],
            false,
        )));
        candidates.push(entry("ERC20", "transfer", &["address", "uint256"]));

        let res = resolve(&transfer_calldata(7), &candidates, None);
        assert_eq!(names(&res), vec!["transfer"]);
        assert!(res.rejected.is_empty());
        assert!(res.unique().is_some());
    }

    #[test]
    fn burn_versus_bytes16() {
        let candidates = vec![
            entry("ERC20Burnable", "burn", &["uint256"]),
            entry("StorageCollator", "collate_propagate_storage", &["bytes16"]),
        ];
        assert_eq!(candidates[0].selector, candidates[1].selector);

        let mut burn = hex::decode("42966c68").unwrap();
        let mut amount = [0u8; 32];
        amount[31] = 5;
        burn.extend(amount);
        let res = resolve(&burn, &candidates, None);
        assert_eq!(names(&res), vec!["burn"]);

        let mut left_aligned = hex::decode("42966c68").unwrap();
        let mut word = [0u8; 32];
        word[0] = 0xde;
        left_aligned.extend(word);
        let res = resolve(&left_aligned, &candidates, None);
        assert_eq!(names(&res), vec!["burn", "collate_propagate_storage"]);
    }

    #[test]
    fn no_candidates_is_empty() {
        let res = resolve(&transfer_calldata(1), &[], None);
        assert!(res.matches.is_empty());
        assert!(res.rejected.is_empty());
        assert_eq!(res.selector.map(|s| s.to_key()), Some("a9059cbb".into()));
    }
}
