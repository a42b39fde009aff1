//! Content-addressed storage for deployment artifacts.
//!
//! Every blob is canonical JSON persisted under a digest of its own bytes, so
//! a locator identifies one logical value forever: writing the same value
//! twice yields the same locator, and two equal locators always address
//! identical content.
//!
//! Two backends implement the [`BlobStore`] trait:
//!
//! - [`LocalBlobStore`] -- one file per blob under a root directory, named by
//!   the lowercase hex digest of the canonical bytes.
//! - [`IpfsBlobStore`] -- pinned objects on an IPFS node reached over its
//!   HTTP API, named by the CID the node reports.
//!
//! Backends are selected by locator scheme through the [`Registry`]; the
//! registry itself performs no addressing logic.

use async_trait::async_trait;
use serde_json::Value;

mod ipfs;
mod local;
mod locator;
mod registry;

pub use ipfs::{IpfsBlobStore, DEFAULT_IPFS_ENDPOINT};
pub use local::LocalBlobStore;
pub use locator::Locator;
pub use registry::{Configuration, Registry};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("locator scheme {actual} does not match backend scheme {expected}")]
    SchemeMismatch { expected: String, actual: String },

    #[error("no content stored at {0}")]
    NotFound(Locator),

    #[error("content network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid blob content: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid locator {0}")]
    InvalidLocator(String),
}

/// Canonical byte form of a blob.
///
/// `serde_json` keeps object keys in a sorted map, so serialization is
/// deterministic for a given logical value and identical values always hash
/// to the same digest.
pub fn canonical_bytes(content: &Value) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(content)?)
}

/// A storage backend addressed by content.
///
/// Implementations must uphold the content-addressing contract: `write` is
/// idempotent for identical logical content, and `read(write(c))` returns a
/// value equal to `c`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Scheme this backend answers for, e.g. `file` or `ipfs`.
    fn scheme(&self) -> &'static str;

    /// Human-readable description of the backend target, for logging only.
    fn label(&self) -> String;

    async fn read(&self, locator: &Locator) -> Result<Value, Error>;

    async fn write(&self, content: &Value) -> Result<Locator, Error>;

    /// Snapshot of all locators currently addressable by this backend.
    ///
    /// Entries in the underlying namespace that do not match the backend's
    /// digest-naming pattern are excluded, never an error.
    async fn list(&self) -> Result<Vec<Locator>, Error>;

    async fn remove(&self, locator: &Locator) -> Result<(), Error>;

    /// Fails with [`Error::SchemeMismatch`] unless `locator` belongs to this
    /// backend.
    fn check_scheme(&self, locator: &Locator) -> Result<(), Error> {
        if locator.scheme() == self.scheme() {
            return Ok(());
        }

        Err(Error::SchemeMismatch {
            expected: self.scheme().to_string(),
            actual: locator.scheme().to_string(),
        })
    }
}
