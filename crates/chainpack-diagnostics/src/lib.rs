//! Contract-aware diagnosis of failed transactions.
//!
//! Turns an opaque provider error into a readable report in stages:
//! classification normalizes the vendor-specific error shape into revert
//! bytes and a transaction request; the replayer re-executes the call on a
//! local development chain to obtain a mined hash; the trace for that hash is
//! fetched; the revert bytes are decoded against built-in encodings or the
//! package's artifact tree. Every stage past classification is optional --
//! failure degrades the report instead of aborting it -- and when nothing at
//! all was recovered the original error is handed back untouched, because
//! wrapping it would only lose information.

use std::fmt::{self, Display};
use std::sync::Arc;

use alloy_primitives::{Bytes, B256};
use chainpack_ethereum::{sort_traces, ArtifactTree, Configuration, EthereumClient, TraceEntry};
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};

pub mod classify;
pub mod decode;
pub mod render;
pub mod replay;
pub mod resolve;

pub use classify::{Classifier, Extraction, RevertExtractor, RevertInfo};
pub use render::{PlainTraceRenderer, TraceRenderer};

/// Name reported when no contract could be matched to the revert.
pub const UNKNOWN_CONTRACT: &str = "unknown";

/// The outcome of diagnosing a provider failure.
///
/// [`Error::Provider`] is the raw error exactly as the provider produced it;
/// [`Error::Diagnosed`] wraps it with whatever context diagnosis recovered.
/// Diagnosing an already diagnosed error is a pass-through, never a second
/// wrap.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("provider error: {0}")]
    Provider(Value),

    #[error(transparent)]
    Diagnosed(DiagnosedError),
}

/// A provider error enriched with decoded revert context.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosedError {
    /// The raw provider error, verbatim.
    pub original: Value,

    /// Dotted qualified name of the reverting contract, when resolved.
    pub contract_name: Option<String>,

    /// Decoded revert message, or the raw revert bytes when nothing decoded,
    /// or empty when no revert data was recovered at all.
    pub message: String,

    /// Rendered trace text; empty when no trace was obtainable.
    pub trace: String,
}

impl DiagnosedError {
    pub fn contract_name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or(UNKNOWN_CONTRACT)
    }
}

impl Display for DiagnosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "transaction failed in contract {}", self.contract_name())?;
        } else {
            write!(f, "revert {} in contract {}", self.message, self.contract_name())?;
        }

        if !self.trace.is_empty() {
            write!(f, "\n{}", self.trace)?;
        }

        Ok(())
    }
}

impl std::error::Error for DiagnosedError {}

/// Internal degradation signals. Logged at warning level, never surfaced.
#[derive(Error, Debug)]
pub(crate) enum Degradation {
    #[error("no revert information recovered from provider error")]
    NoRevertInfo,

    #[error("replay unavailable: {0}")]
    ReplayUnavailable(String),

    #[error("trace unavailable: {0}")]
    TraceUnavailable(String),

    #[error("revert data did not resolve against any known interface")]
    DecodeUnresolved,
}

/// Orchestrates the diagnosis stages against one connected node.
///
/// The artifact tree is borrowed per call and never mutated, so one client
/// can serve concurrent diagnoses.
pub struct DiagnosticClient {
    client: EthereumClient,
    classifier: Classifier,
    renderer: Arc<dyn TraceRenderer>,
}

impl DiagnosticClient {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            client: EthereumClient::new(configuration),
            classifier: Classifier::new(),
            renderer: Arc::new(PlainTraceRenderer),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TraceRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Runs the full diagnosis chain over a provider error.
    ///
    /// Returns [`Error::Diagnosed`] when at least one diagnostic signal was
    /// recovered, otherwise the untouched input error.
    #[instrument(skip_all)]
    pub async fn diagnose(&self, error: Error, artifacts: &ArtifactTree) -> Error {
        let Error::Provider(raw) = error else {
            return error;
        };

        let info = self.classifier.classify(&raw);

        let hash = match &info.txn_request {
            Some(request) => self.replay(request).await,
            None => None,
        };

        let mut traces = match hash {
            Some(hash) => self.fetch_trace(hash).await,
            None => Vec::new(),
        };
        sort_traces(&mut traces);

        if info.is_empty() && hash.is_none() && traces.is_empty() {
            warn!("{}", Degradation::NoRevertInfo);
            return Error::Provider(raw);
        }

        let (contract_name, message) = match &info.revert_data {
            Some(data) => self.decode(data, &info, artifacts),
            None => (None, String::new()),
        };

        Error::Diagnosed(DiagnosedError {
            original: raw,
            contract_name,
            message,
            trace: self.renderer.render(&traces, artifacts),
        })
    }

    async fn replay(&self, request: &chainpack_ethereum::TransactionRequest) -> Option<B256> {
        match replay::replay(&self.client, request).await {
            Ok(hash) => Some(hash),
            Err(degradation) => {
                warn!("{degradation}");
                None
            },
        }
    }

    async fn fetch_trace(&self, hash: B256) -> Vec<TraceEntry> {
        match self.client.trace_transaction(hash).await {
            Ok(traces) => traces,
            Err(e) => {
                warn!("{}", Degradation::TraceUnavailable(e.to_string()));
                Vec::new()
            },
        }
    }

    fn decode(&self, data: &Bytes, info: &RevertInfo, artifacts: &ArtifactTree) -> (Option<String>, String) {
        if let Some(message) = decode::decode_builtin(data) {
            return (None, message);
        }

        // The contract the failed call targeted, when the tree knows it, is
        // the explicit candidate interface tried before any tree search.
        if let Some(target) = info.txn_request.as_ref().and_then(|request| request.to) {
            if let Some((name, contract)) = artifacts.find_by_address(target) {
                if let Some(message) = decode::decode_custom(data, &contract.abi) {
                    return (Some(name), message);
                }
            }
        }

        if let Some((name, message)) = resolve::resolve_revert(artifacts, data) {
            return (Some(name), message);
        }

        warn!("{}", Degradation::DecodeUnresolved);
        (None, decode::format_raw(data))
    }
}
