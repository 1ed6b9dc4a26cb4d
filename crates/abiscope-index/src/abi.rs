//! Conversion from standard JSON ABI (via `alloy-json-abi`) into `AbiEntry`.

use abiscope_core::entry::{AbiEntry, AbiParam};
use alloy_json_abi::{EventParam, JsonAbi, Param};
use serde::Deserialize;
use tracing::warn;

/// Parse the `abi` field of a table record.
///
/// Accepts either a JSON ABI array or a string containing one (some exports
/// store the ABI stringified).
pub fn parse_abi(value: &serde_json::Value) -> Result<JsonAbi, serde_json::Error> {
    match value {
        serde_json::Value::String(s) => serde_json::from_str(s),
        other => JsonAbi::deserialize(other),
    }
}

/// All functions, errors and events declared in `abi`, tagged with `contract`.
///
/// Constructors, fallback and receive carry no selector and are skipped.
pub fn entries_from_abi(contract: &str, abi: &JsonAbi) -> Vec<AbiEntry> {
    let mut entries = Vec::new();

    for func in abi.functions() {
        let entry = AbiEntry::function(
            contract,
            func.name.clone(),
            func.inputs.iter().map(param).collect(),
            func.outputs.iter().map(param).collect(),
        )
        .with_state_mutability(func.state_mutability.as_json_str());
        check_selector(&entry, func.selector().0);
        entries.push(entry);
    }

    for err in abi.errors() {
        let entry = AbiEntry::error(contract, err.name.clone(), err.inputs.iter().map(param).collect());
        check_selector(&entry, err.selector().0);
        entries.push(entry);
    }

    for event in abi.events() {
        let entry = AbiEntry::event(
            contract,
            event.name.clone(),
            event.inputs.iter().map(event_param).collect(),
            event.anonymous,
        );
        let topic = event.selector().0;
        if entry.topic0 != Some(topic) {
            warn!(
                contract,
                event = %event.signature(),
                "event topic computed from canonical inputs disagrees with alloy"
            );
        }
        entries.push(entry);
    }

    entries
}

fn param(p: &Param) -> AbiParam {
    AbiParam::new(p.name.clone(), p.selector_type().into_owned())
        .with_components(p.components.iter().map(param).collect())
}

fn event_param(p: &EventParam) -> AbiParam {
    let converted = AbiParam::new(p.name.clone(), p.selector_type().into_owned())
        .with_components(p.components.iter().map(param).collect());
    if p.indexed {
        converted.indexed()
    } else {
        converted
    }
}

/// The selector is derived from our own canonical signature; alloy computes
/// it independently. A disagreement means the type canonicalization drifted.
fn check_selector(entry: &AbiEntry, alloy_selector: [u8; 4]) {
    if entry.selector.0 != alloy_selector {
        warn!(
            contract = %entry.contract,
            signature = %entry.signature(),
            computed = %entry.selector,
            alloy = %hex::encode(alloy_selector),
            "selector computed from canonical inputs disagrees with alloy"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiscope_core::entry::EntryKind;

    const ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"name","type":"string"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"balanceOf","inputs":[{"name":"account","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"execute","inputs":[{"name":"calls","type":"tuple[]","components":[
            {"name":"target","type":"address"},{"name":"value","type":"uint256"},{"name":"data","type":"bytes"}]}],
         "outputs":[],"stateMutability":"payable"},
        {"type":"error","name":"ERC20InsufficientBalance","inputs":[
            {"name":"sender","type":"address"},{"name":"balance","type":"uint256"},{"name":"needed","type":"uint256"}]},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    #[test]
    fn converts_all_selector_bearing_items() {
        let abi = parse_abi(&serde_json::from_str(ABI).unwrap()).unwrap();
        let entries = entries_from_abi("Token", &abi);
        assert_eq!(entries.len(), 4);

        let balance_of = entries.iter().find(|e| e.name == "balanceOf").unwrap();
        assert_eq!(balance_of.kind, EntryKind::Function);
        assert_eq!(balance_of.selector.to_key(), "70a08231");
        assert_eq!(balance_of.state_mutability.as_deref(), Some("view"));
        assert_eq!(balance_of.contract, "Token");

        let execute = entries.iter().find(|e| e.name == "execute").unwrap();
        assert_eq!(execute.inputs[0].ty, "(address,uint256,bytes)[]");
        assert_eq!(execute.inputs[0].components.len(), 3);
        assert_eq!(execute.selector.to_key(), "3f707e6b");

        let err = entries.iter().find(|e| e.kind == EntryKind::Error).unwrap();
        assert_eq!(err.selector.to_key(), "e450d38c");

        let transfer = entries.iter().find(|e| e.kind == EntryKind::Event).unwrap();
        assert!(transfer.inputs[0].indexed);
        assert!(!transfer.inputs[2].indexed);
    }

    #[test]
    fn accepts_stringified_abi() {
        let value = serde_json::Value::String(ABI.to_string());
        let abi = parse_abi(&value).unwrap();
        assert_eq!(abi.functions().count(), 2);
    }

    #[test]
    fn rejects_non_abi_json() {
        let value = serde_json::json!({"not": "an abi"});
        assert!(parse_abi(&value).is_err());
    }
}
