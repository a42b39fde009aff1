use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::{canonical_bytes, BlobStore, Error, Locator};

pub const FILE_SCHEME: &str = "file";

const CONTENT_SUFFIX: &str = ".json";

lazy_static! {
    /// Names a blob file is allowed to have: lowercase hex blake3 digest plus
    /// the content suffix. Anything else in the root directory is foreign and
    /// ignored.
    static ref DIGEST_NAME: Regex = Regex::new(r"^[0-9a-f]{64}\.json$").unwrap();
}

/// Filesystem-backed blob store, one file per blob under a root directory.
///
/// The root is created lazily on first write so that a freshly configured
/// store can be read-queried without touching the disk.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, locator: &Locator) -> Result<PathBuf, Error> {
        // Rejecting non-digest identifiers also rejects path traversal.
        if !DIGEST_NAME.is_match(locator.identifier()) {
            return Err(Error::NotFound(locator.clone()));
        }

        Ok(self.root.join(locator.identifier()))
    }

    fn identifier_for(bytes: &[u8]) -> String {
        format!("{}{}", blake3::hash(bytes).to_hex(), CONTENT_SUFFIX)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn scheme(&self) -> &'static str {
        FILE_SCHEME
    }

    fn label(&self) -> String {
        format!("LocalBlobStore({})", self.root.display())
    }

    async fn read(&self, locator: &Locator) -> Result<Value, Error> {
        self.check_scheme(locator)?;

        let path = self.blob_path(locator)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::NotFound(locator.clone())),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, content: &Value) -> Result<Locator, Error> {
        let bytes = canonical_bytes(content)?;
        let locator = Locator::new(FILE_SCHEME, Self::identifier_for(&bytes));

        fs::create_dir_all(&self.root).await?;

        // Identical content maps to an identical path, so a concurrent or
        // repeated write lays down the exact same bytes.
        let path = self.root.join(locator.identifier());
        fs::write(&path, &bytes).await?;

        debug!(locator = %locator, "blob written");
        Ok(locator)
    }

    async fn list(&self) -> Result<Vec<Locator>, Error> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut locators = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };

            if DIGEST_NAME.is_match(name) {
                locators.push(Locator::new(FILE_SCHEME, name));
            }
        }

        Ok(locators)
    }

    async fn remove(&self, locator: &Locator) -> Result<(), Error> {
        self.check_scheme(locator)?;

        let path = self.blob_path(locator)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(locator.clone())),
            Err(e) => Err(e.into()),
        }
    }
}
