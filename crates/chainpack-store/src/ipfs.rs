use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HTTPClient;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{canonical_bytes, BlobStore, Error, Locator};

pub const IPFS_SCHEME: &str = "ipfs";

/// Public gateway used when no endpoint is configured.
pub const DEFAULT_IPFS_ENDPOINT: &str = "https://ipfs.infura.io:5001";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static! {
    // CIDv0 (Qm + base58) or CIDv1 (base32). Pins that are not ours, e.g.
    // node-internal objects, are excluded from listings.
    static ref CID_NAME: Regex = Regex::new(r"^(Qm[1-9A-HJ-NP-Za-km-z]{44}|baf[a-z2-7]+)$").unwrap();
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize)]
struct PinListResponse {
    #[serde(rename = "Keys", default)]
    keys: HashMap<String, PinEntry>,
}

#[derive(Deserialize)]
struct PinEntry {
    #[serde(rename = "Type")]
    kind: String,
}

/// Blob store backed by the HTTP API of an IPFS node.
///
/// Writes `add` (and therefore pin) the canonical bytes; reads `cat` them
/// back; `list` enumerates recursive pins. Connectivity failures surface as
/// [`Error::NetworkUnavailable`] so callers can distinguish "the network is
/// down" from "the content does not exist", even though both interrupt the
/// same control flow.
pub struct IpfsBlobStore {
    endpoint: String,
    client: HTTPClient,
}

impl IpfsBlobStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: HTTPClient::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("invalid client"),
        }
    }

    fn api_url(&self, command: &str) -> String {
        format!("{}/api/v0/{}", self.endpoint.trim_end_matches('/'), command)
    }

    fn map_transport(error: reqwest::Error) -> Error {
        if error.is_connect() || error.is_timeout() {
            Error::NetworkUnavailable(error.to_string())
        } else {
            Error::Http(error)
        }
    }
}

#[async_trait]
impl BlobStore for IpfsBlobStore {
    fn scheme(&self) -> &'static str {
        IPFS_SCHEME
    }

    fn label(&self) -> String {
        format!("IpfsBlobStore({})", self.endpoint)
    }

    async fn read(&self, locator: &Locator) -> Result<Value, Error> {
        self.check_scheme(locator)?;

        let response = self
            .client
            .post(self.api_url("cat"))
            .query(&[("arg", locator.identifier())])
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Error::NotFound(locator.clone()));
        }

        let bytes = response.bytes().await.map_err(Self::map_transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, content: &Value) -> Result<Locator, Error> {
        let bytes = canonical_bytes(content)?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name("blob.json"));

        let response = self
            .client
            .post(self.api_url("add"))
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Error::NetworkUnavailable(format!(
                "add rejected with status {}",
                response.status()
            )));
        }

        let added: AddResponse = response.json().await.map_err(Self::map_transport)?;
        let locator = Locator::new(IPFS_SCHEME, added.hash);

        debug!(locator = %locator, "blob pinned");
        Ok(locator)
    }

    async fn list(&self) -> Result<Vec<Locator>, Error> {
        let response = self
            .client
            .post(self.api_url("pin/ls"))
            .query(&[("type", "recursive")])
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Error::NetworkUnavailable(format!(
                "pin listing rejected with status {}",
                response.status()
            )));
        }

        let pins: PinListResponse = response.json().await.map_err(Self::map_transport)?;

        Ok(pins
            .keys
            .into_iter()
            .filter(|(cid, entry)| entry.kind == "recursive" && CID_NAME.is_match(cid))
            .map(|(cid, _)| Locator::new(IPFS_SCHEME, cid))
            .collect())
    }

    async fn remove(&self, locator: &Locator) -> Result<(), Error> {
        self.check_scheme(locator)?;

        let response = self
            .client
            .post(self.api_url("pin/rm"))
            .query(&[("arg", locator.identifier())])
            .send()
            .await
            .map_err(Self::map_transport)?;

        if !response.status().is_success() {
            return Err(Error::NotFound(locator.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const CID: &str = "QmZ4tDuvesekSs4qM5ZBKpXiZGun7S2CYtEZRB3DYXkjGx";

    mod write {
        use super::*;

        #[tokio::test]
        async fn should_return_locator_with_reported_cid() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/add"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "Name": "blob.json", "Hash": CID, "Size": "12"
                })))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            let locator = store.write(&json!({"a": 1})).await.unwrap();

            assert_eq!(locator, Locator::new("ipfs", CID));
        }

        #[tokio::test]
        async fn should_fail_with_network_unavailable_when_node_is_down() {
            // Nothing listens on this port.
            let store = IpfsBlobStore::new("http://127.0.0.1:1");

            let result = store.write(&json!({"a": 1})).await;

            assert!(matches!(result, Err(Error::NetworkUnavailable(_))));
        }
    }

    mod read {
        use super::*;

        #[tokio::test]
        async fn should_return_stored_content() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/cat"))
                .and(query_param("arg", CID))
                .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "text/plain"))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            let content = store.read(&Locator::new("ipfs", CID)).await.unwrap();

            assert_eq!(content, json!({"a": 1}));
        }

        #[tokio::test]
        async fn should_fail_with_not_found_for_error_status() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/cat"))
                .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                    "Message": "invalid path", "Code": 0
                })))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            let result = store.read(&Locator::new("ipfs", CID)).await;

            assert!(matches!(result, Err(Error::NotFound(_))));
        }

        #[tokio::test]
        async fn should_fail_with_scheme_mismatch_for_foreign_locator() {
            let store = IpfsBlobStore::new("http://127.0.0.1:1");
            let locator = Locator::new("file", format!("{}.json", "0".repeat(64)));

            let result = store.read(&locator).await;

            assert!(matches!(result, Err(Error::SchemeMismatch { .. })));
        }
    }

    mod list {
        use super::*;

        #[tokio::test]
        async fn should_return_recursive_pins_only() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/pin/ls"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "Keys": {
                        CID: {"Type": "recursive"},
                        "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG": {"Type": "indirect"}
                    }
                })))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            let locators = store.list().await.unwrap();

            assert_eq!(locators, vec![Locator::new("ipfs", CID)]);
        }
    }

    mod remove {
        use super::*;

        #[tokio::test]
        async fn should_fail_with_not_found_when_pin_is_missing() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/pin/rm"))
                .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                    "Message": "not pinned or pinned indirectly", "Code": 0
                })))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            let result = store.remove(&Locator::new("ipfs", CID)).await;

            assert!(matches!(result, Err(Error::NotFound(_))));
        }

        #[tokio::test]
        async fn should_succeed_when_pin_is_dropped() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v0/pin/rm"))
                .and(query_param("arg", CID))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Pins": [CID]})))
                .mount(&server)
                .await;
            let store = IpfsBlobStore::new(server.uri());

            store.remove(&Locator::new("ipfs", CID)).await.unwrap();
        }
    }
}
