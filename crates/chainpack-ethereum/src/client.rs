use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256};
use reqwest::Client as HTTPClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::trace::TraceEntry;
use crate::transaction::TransactionRequest;
use crate::{Configuration, Error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

/// JSON-RPC client for the connected node.
///
/// Method names come from [`Configuration::methods`] so the same client talks
/// to any vendor's development node.
pub struct EthereumClient {
    configuration: Configuration,
    client: HTTPClient,
    request_id: AtomicU64,
}

impl EthereumClient {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            configuration: configuration.clone(),
            client: HTTPClient::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("invalid client"),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.configuration.endpoint
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, Error> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .client
            .post(&self.configuration.endpoint)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        // Some nodes answer administrative calls with a null result.
        let result = response.result.unwrap_or(Value::Null);

        serde_json::from_value(result).map_err(|e| Error::Format(e.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn client_version(&self) -> Result<String, Error> {
        self.call(&self.configuration.methods.client_version, json!([])).await
    }

    /// Whether the connected node self-identifies as a local development
    /// chain, by marker substring in its client version string.
    pub async fn is_development_chain(&self) -> Result<bool, Error> {
        let version = self.client_version().await?.to_lowercase();

        Ok(self
            .configuration
            .development_markers
            .iter()
            .any(|marker| version.contains(&marker.to_lowercase())))
    }

    #[instrument(skip(self))]
    pub async fn impersonate(&self, account: Address) -> Result<(), Error> {
        // Nodes answer true or null here; only failure matters.
        let _: Value = self
            .call(&self.configuration.methods.impersonate_account, json!([account]))
            .await?;

        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256, Error> {
        self.call(&self.configuration.methods.send_transaction, json!([request])).await
    }

    #[instrument(skip(self))]
    pub async fn trace_transaction(&self, hash: B256) -> Result<Vec<TraceEntry>, Error> {
        let traces: Option<Vec<TraceEntry>> = self
            .call(&self.configuration.methods.trace_transaction, json!([hash]))
            .await?;

        Ok(traces.unwrap_or_default())
    }
}
