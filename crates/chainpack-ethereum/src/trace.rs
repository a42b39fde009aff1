use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// One frame of a transaction's call/create trace, parity wire shape.
///
/// `trace_address` is the frame's pre-order position in the call tree: `[]`
/// is the root call, `[0]` its first subcall, `[0, 1]` the second subcall of
/// that subcall. Sorting a transaction's entries by `trace_address`
/// reconstructs execution order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub action: TraceAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TraceResult>,

    pub subtraces: usize,

    pub trace_address: Vec<usize>,

    pub transaction_hash: B256,

    #[serde(rename = "type")]
    pub kind: TraceKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Call,
    Create,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TraceAction {
    Call(CallAction),
    Create(CreateAction),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallAction {
    pub from: Address,
    pub to: Address,
    pub gas: U256,
    pub input: Bytes,
    pub value: U256,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAction {
    pub from: Address,
    pub gas: U256,
    pub init: Bytes,
    pub value: U256,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    pub gas_used: U256,

    pub output: Bytes,

    /// Status code some nodes attach to failed frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u64>,
}

/// Restores execution order for the entries of a single transaction.
pub fn sort_traces(entries: &mut [TraceEntry]) {
    entries.sort_by(|a, b| a.trace_address.cmp(&b.trace_address));
}
