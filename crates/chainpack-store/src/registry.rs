use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ipfs::{IpfsBlobStore, DEFAULT_IPFS_ENDPOINT};
use crate::local::LocalBlobStore;
use crate::{BlobStore, Error, Locator};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Configuration {
    /// Root directory of the local backend.
    pub root: PathBuf,

    /// IPFS API endpoint; [`DEFAULT_IPFS_ENDPOINT`] when unset.
    #[serde(default)]
    pub ipfs_endpoint: Option<String>,
}

/// Scheme to backend mapping, built once from configuration.
///
/// The registry holds no addressing logic of its own; it only hands callers
/// the backend whose scheme matches a locator.
#[derive(Clone)]
pub struct Registry {
    backends: IndexMap<&'static str, Arc<dyn BlobStore>>,
}

impl Registry {
    pub fn new(configuration: &Configuration) -> Self {
        let local = LocalBlobStore::new(&configuration.root);
        let ipfs = IpfsBlobStore::new(
            configuration
                .ipfs_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_IPFS_ENDPOINT),
        );

        let mut backends: IndexMap<&'static str, Arc<dyn BlobStore>> = IndexMap::new();
        backends.insert(local.scheme(), Arc::new(local));
        backends.insert(ipfs.scheme(), Arc::new(ipfs));

        Self { backends }
    }

    pub fn schemes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.backends.keys().copied()
    }

    pub fn store(&self, scheme: &str) -> Option<Arc<dyn BlobStore>> {
        self.backends.get(scheme).cloned()
    }

    /// Backend matching the locator's scheme.
    pub fn resolve(&self, locator: &Locator) -> Result<Arc<dyn BlobStore>, Error> {
        self.store(locator.scheme()).ok_or_else(|| Error::SchemeMismatch {
            expected: self.backends.keys().copied().collect::<Vec<_>>().join("|"),
            actual: locator.scheme().to_string(),
        })
    }

    pub async fn read(&self, locator: &Locator) -> Result<Value, Error> {
        self.resolve(locator)?.read(locator).await
    }

    pub async fn remove(&self, locator: &Locator) -> Result<(), Error> {
        self.resolve(locator)?.remove(locator).await
    }
}
