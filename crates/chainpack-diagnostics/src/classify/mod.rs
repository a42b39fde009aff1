//! Normalization of raw provider errors.
//!
//! Every node vendor and client library wraps a revert differently, so the
//! classifier is an ordered registry of shape matchers over the raw
//! structured error. Each matcher either recognizes the shape and produces a
//! normalized [`RevertInfo`], unwraps a nested inner error for another round,
//! or declines. First match wins; new vendor quirks become new matchers
//! without touching existing ones.

use alloy_primitives::Bytes;
use chainpack_ethereum::TransactionRequest;
use serde_json::Value;
use tracing::debug;

mod extractors;

pub use extractors::{
    CallExceptionExtractor, GasEstimationExtractor, InternalErrorExtractor, LegacyRevertExtractor,
    ResponseBodyExtractor,
};

/// Wrapped-error chains deeper than this are abandoned as malformed.
const MAX_NESTING: usize = 8;

/// What classification managed to recover from a raw provider error.
#[derive(Debug, Clone, Default)]
pub struct RevertInfo {
    pub revert_data: Option<Bytes>,
    pub txn_request: Option<TransactionRequest>,
}

impl RevertInfo {
    pub fn is_empty(&self) -> bool {
        self.revert_data.is_none() && self.txn_request.is_none()
    }
}

pub enum Extraction {
    /// The error matched this shape; classification is done.
    Resolved(RevertInfo),

    /// The error wraps an inner error; classify that instead.
    Nested(Value),
}

pub trait RevertExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_extract(&self, error: &Value) -> Option<Extraction>;
}

pub struct Classifier {
    extractors: Vec<Box<dyn RevertExtractor>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Registry in priority order; earlier matchers shadow later ones.
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(GasEstimationExtractor),
                Box::new(CallExceptionExtractor),
                Box::new(LegacyRevertExtractor),
                Box::new(InternalErrorExtractor),
                Box::new(ResponseBodyExtractor),
            ],
        }
    }

    pub fn classify(&self, error: &Value) -> RevertInfo {
        let mut current = error.clone();

        for _ in 0..MAX_NESTING {
            let matched = self
                .extractors
                .iter()
                .find_map(|extractor| extractor.try_extract(&current).map(|e| (extractor.name(), e)));

            match matched {
                Some((name, Extraction::Resolved(info))) => {
                    debug!(extractor = name, "provider error classified");
                    return info;
                },
                Some((name, Extraction::Nested(inner))) => {
                    debug!(extractor = name, "descending into wrapped error");
                    current = inner;
                },
                None => break,
            }
        }

        RevertInfo::default()
    }
}

/// Parses a `0x`-prefixed hex field into revert bytes.
fn parse_revert_bytes(value: &Value) -> Option<Bytes> {
    let text = value.as_str()?;
    if !text.starts_with("0x") {
        return None;
    }

    text.parse().ok()
}

fn numeric_code(error: &Value) -> Option<i64> {
    error.get("code")?.as_i64()
}
