//! Ethereum node access for the package manager.
//!
//! A thin JSON-RPC layer over HTTP plus the chain-side data types the rest of
//! the workspace consumes: transaction requests, call/create traces and the
//! artifact tree describing compiled contracts. RPC method names are
//! configuration, not constants, because the debugging capabilities this
//! crate leans on (impersonation, tracing) are named differently by every
//! development node vendor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod client;
mod contract;
mod trace;
mod transaction;

pub use client::EthereumClient;
pub use contract::{ArtifactTree, ContractData};
pub use trace::{sort_traces, CallAction, CreateAction, TraceAction, TraceEntry, TraceKind, TraceResult};
pub use transaction::TransactionRequest;

#[derive(Error, Debug)]
pub enum Error {
    #[error("rpc error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unexpected response format: {0}")]
    Format(String),
}

/// RPC method names consumed from the connected node.
///
/// Defaults target a hardhat-style development node with parity-style
/// tracing; point them elsewhere for other vendors (e.g.
/// `anvil_impersonateAccount`).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RpcMethods {
    pub client_version: String,
    pub impersonate_account: String,
    pub send_transaction: String,
    pub trace_transaction: String,
}

impl Default for RpcMethods {
    fn default() -> Self {
        Self {
            client_version: "web3_clientVersion".to_string(),
            impersonate_account: "hardhat_impersonateAccount".to_string(),
            send_transaction: "eth_sendTransaction".to_string(),
            trace_transaction: "trace_transaction".to_string(),
        }
    }
}

fn default_development_markers() -> Vec<String> {
    ["testrpc", "ganache", "hardhat", "anvil"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Configuration {
    pub endpoint: String,

    #[serde(default)]
    pub methods: RpcMethods,

    /// Substrings of a client version string that identify a local
    /// development chain.
    #[serde(default = "default_development_markers")]
    pub development_markers: Vec<String>,
}

impl Configuration {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            methods: RpcMethods::default(),
            development_markers: default_development_markers(),
        }
    }
}
