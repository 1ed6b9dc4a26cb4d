//! End-to-end decode tests against the OpenZeppelin sample table.
//!
//! `fixtures/calls/openzeppelin-calls.json` lists raw calldata with the
//! candidates each must resolve to, best first.

use abiscope_core::{
    entry::EntryKind,
    selector::{keccak256, Selector},
    types::NormalizedValue,
};
use abiscope_engine::{DecodeEngine, DecodeRequest, EngineConfig, EngineError};
use abiscope_evm::{decode, encode_call};
use serde::Deserialize;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn fixture_path(rel: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures");
    p.push(rel);
    p
}

fn engine() -> DecodeEngine {
    let config = EngineConfig::with_table(fixture_path("tables/openzeppelin-sample.json"));
    DecodeEngine::from_config(config).expect("fixture table must build")
}

fn calldata(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str.trim_start_matches("0x")).expect("fixture calldata is hex")
}

fn word(v: u64) -> Vec<u8> {
    let mut w = vec![0u8; 32];
    w[24..].copy_from_slice(&v.to_be_bytes());
    w
}

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

/// A representative value for a static type, `None` for dynamic ones.
fn sample(ty: &str) -> Option<NormalizedValue> {
    if let Some(inner) = ty.strip_suffix(']') {
        let (elem, len) = inner.rsplit_once('[')?;
        let len: usize = len.parse().ok()?;
        return (0..len).map(|_| sample(elem)).collect::<Option<_>>().map(NormalizedValue::Array);
    }
    match ty {
        "address" => Some(NormalizedValue::Address(VITALIK.into())),
        "bool" => Some(NormalizedValue::Bool(true)),
        _ if ty.starts_with("uint") => Some(NormalizedValue::Uint(7)),
        _ if ty.starts_with("int") => Some(NormalizedValue::Int(-3)),
        _ => {
            let size: usize = ty.strip_prefix("bytes")?.parse().ok()?;
            Some(NormalizedValue::Bytes(vec![0xab; size]))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallCase {
    description: String,
    calldata: String,
    #[serde(default)]
    contract_hint: Option<String>,
    expected: Vec<String>,
}

fn load_cases() -> Vec<CallCase> {
    let path = fixture_path("calls/openzeppelin-calls.json");
    let content = std::fs::read_to_string(&path).expect("calls fixture not found");
    serde_json::from_str(&content).expect("calls fixture is valid JSON")
}

// ─── Fixture cases ────────────────────────────────────────────────────────────

#[test]
fn every_call_case_resolves_as_expected() {
    let engine = engine();
    for case in load_cases() {
        let found = engine
            .decode(&calldata(&case.calldata), None, case.contract_hint.as_deref())
            .unwrap_or_else(|e| panic!("{}: {e}", case.description));
        let got: Vec<String> = found
            .iter()
            .map(|c| format!("{}.{}", c.entry.contract, c.entry.signature()))
            .collect();
        assert_eq!(got, case.expected, "{}", case.description);
    }
}

#[test]
fn batch_matches_single_decodes() {
    let engine = engine();
    let cases = load_cases();
    let requests: Vec<DecodeRequest> = cases
        .iter()
        .map(|case| {
            let req = DecodeRequest::new(calldata(&case.calldata));
            match &case.contract_hint {
                Some(hint) => req.contract_hint(hint.clone()),
                None => req,
            }
        })
        .collect();

    let results = engine.decode_batch(&requests);
    assert_eq!(results.len(), cases.len());
    for (case, result) in cases.iter().zip(results) {
        let found = result.unwrap_or_else(|e| panic!("{}: {e}", case.description));
        assert_eq!(found.len(), case.expected.len(), "{}", case.description);
    }
}

#[test]
fn every_static_function_roundtrips() {
    let engine = engine();
    let index = engine.index().load();
    let mut checked = 0;

    for record in index.contracts() {
        for entry in record.entries.iter().filter(|e| e.kind == EntryKind::Function) {
            let Some(args) = entry
                .inputs
                .iter()
                .map(|p| sample(&p.ty))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let data = encode_call(entry, &args).unwrap_or_else(|e| panic!("{entry}: {e}"));

            let call = decode(&data, entry).unwrap_or_else(|e| panic!("{entry}: {e}"));
            let got: Vec<NormalizedValue> = call.values().into_iter().cloned().collect();
            assert_eq!(got, args, "{entry}");

            let found = engine.decode(&data, None, None).unwrap();
            assert!(
                found.iter().any(|c| c.entry.same_declaration(entry)),
                "{entry} missing from its own selector's candidates"
            );
            checked += 1;
        }
    }
    assert_eq!(checked, 53);
}

// ─── Key handling ─────────────────────────────────────────────────────────────

#[test]
fn contract_key_is_not_a_function_selector() {
    let engine = engine();
    let key: Selector = "274c7b3c".parse().unwrap();

    let mut data = key.0.to_vec();
    data.extend([0u8; 32]);
    assert!(engine.decode(&data, None, None).unwrap().is_empty());

    let index = engine.index().load();
    let records = index.contracts_for_key(key);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "ERC20PresetMinterPauser");
}

#[test]
fn selector_hint_must_agree_with_calldata() {
    let engine = engine();
    let data = calldata(&load_cases()[0].calldata);
    let balance_of: Selector = "70a08231".parse().unwrap();
    let burn: Selector = "42966c68".parse().unwrap();

    assert_eq!(engine.decode(&data, Some(balance_of), None).unwrap().len(), 1);
    assert!(engine.decode(&data, Some(burn), None).unwrap().is_empty());
}

// ─── Nested dynamic calls ─────────────────────────────────────────────────────

#[test]
fn executor_batch_with_tuple_array() {
    let engine = engine();
    let index = engine.index().load();
    let executor = index.contract("Executor").expect("Executor record");
    let execute = executor.entries[0].clone();

    let calls = NormalizedValue::Array(vec![
        NormalizedValue::Tuple(vec![
            ("target".into(), NormalizedValue::Address(VITALIK.into())),
            ("value".into(), NormalizedValue::Uint(0)),
            ("data".into(), NormalizedValue::Bytes(vec![0x84, 0x56, 0xcb, 0x59])),
        ]),
        NormalizedValue::Tuple(vec![
            ("target".into(), NormalizedValue::Address(VITALIK.into())),
            ("value".into(), NormalizedValue::Uint(1_000_000_000)),
            ("data".into(), NormalizedValue::Bytes(vec![])),
        ]),
    ]);
    let data = encode_call(&execute, &[calls.clone()]).unwrap();

    let found = engine.decode(&data, None, None).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].call.arguments[0].1, calls);
}

#[test]
fn multicall_payload_decodes_inner_calls() {
    let engine = engine();
    let index = engine.index().load();
    let multicall = index.contract("Multicall").expect("Multicall record").entries[0].clone();
    assert_eq!(multicall.selector.to_key(), "ac9650d8");

    let mut inner = calldata("70a08231");
    inner.extend(calldata("000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"));
    let outer = encode_call(
        &multicall,
        &[NormalizedValue::Array(vec![NormalizedValue::Bytes(inner.clone())])],
    )
    .unwrap();

    let found = engine.decode(&outer, None, Some("Multicall")).unwrap();
    assert_eq!(found.len(), 1);
    let Some(NormalizedValue::Array(items)) = found[0].call.arguments.first().map(|(_, v)| v) else {
        panic!("multicall argument is not an array");
    };
    let Some(NormalizedValue::Bytes(payload)) = items.first() else {
        panic!("multicall item is not bytes");
    };
    let nested = engine.decode(payload, None, None).unwrap();
    assert_eq!(nested[0].entry.name, "balanceOf");
}

#[test]
fn corrupted_nested_offset_is_rejected_with_position() {
    let engine = engine();
    let index = engine.index().load();
    let multicall = index.contract("Multicall").expect("Multicall record").entries[0].clone();

    let mut data = encode_call(&multicall, &[NormalizedValue::Array(vec![NormalizedValue::Bytes(vec![1, 2, 3])])]).unwrap();
    // element offset of data[0], relative to the array body
    let at = 4 + 32 + 32;
    data[at + 31] = 0xff;

    let res = engine.decode_detailed(&data, None, None).unwrap();
    assert!(res.matches.is_empty());
    assert_eq!(res.rejected.len(), 1);
    assert_eq!(res.rejected[0].error.kind(), "offset_out_of_bounds");
}

// ─── Reverts and logs ─────────────────────────────────────────────────────────

#[test]
fn custom_error_revert() {
    let engine = engine();
    let mut data = calldata("e450d38c");
    data.extend(calldata("000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"));
    data.extend(word(10));
    data.extend(word(25));

    let res = engine.decode_revert(&data, None).unwrap();
    let candidate = res.unique().expect("single error candidate");
    assert_eq!(candidate.entry.name, "ERC20InsufficientBalance");
    assert_eq!(candidate.call.argument("needed"), Some(&NormalizedValue::Uint(25)));
}

#[test]
fn erc20_transfer_log() {
    let engine = engine();
    let topic0 = keccak256(b"Transfer(address,address,uint256)");
    let mut to = [0u8; 32];
    to[31] = 0x02;
    let mut from = [0u8; 32];
    from[12..].copy_from_slice(&calldata("d8da6bf26964af9d7eed9e03e53415d37aa96045"));

    let logs = engine.decode_log(&[topic0, from, to], &word(1_000_000)).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].entry.contract, "ERC20PresetMinterPauser");
    assert_eq!(
        logs[0].argument("from"),
        Some(&NormalizedValue::Address(VITALIK.into()))
    );
    assert_eq!(logs[0].argument("value"), Some(&NormalizedValue::Uint(1_000_000)));
}

// ─── Configuration and reload ─────────────────────────────────────────────────

#[test]
fn engine_from_yaml_config_file() {
    let config = EngineConfig::from_path(&fixture_path("config/engine.yaml")).unwrap();
    assert_eq!(config.batch_chunk_size, 4);
    let engine = DecodeEngine::from_config(config).unwrap();
    assert_eq!(engine.index().load().report().records, 32);
}

#[test]
fn from_config_installs_log_settings() {
    let config = EngineConfig::from_path(&fixture_path("config/engine.yaml")).unwrap();
    DecodeEngine::from_config(config.clone()).unwrap();
    assert!(abiscope_observability::try_init_tracing(&config.log).is_err());

    // a second engine keeps the subscriber already in place
    assert!(DecodeEngine::from_config(config).is_ok());
}

#[test]
fn reload_from_path_reports_and_swaps() {
    let engine = engine();
    let report = engine
        .reload_from_path(&fixture_path("tables/openzeppelin-sample.json"))
        .unwrap();
    assert_eq!(report.collisions.len(), 2);
    assert_eq!(report.selectors, engine.index().load().selector_count());

    let missing = engine.reload_from_path(&fixture_path("tables/does-not-exist.json"));
    assert!(matches!(missing, Err(EngineError::Index(_))));
}
