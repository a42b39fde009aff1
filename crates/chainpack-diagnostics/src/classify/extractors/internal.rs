use serde_json::Value;

use crate::classify::{numeric_code, parse_revert_bytes, Extraction, RevertExtractor, RevertInfo};

/// JSON-RPC internal error.
const INTERNAL_ERROR_CODE: i64 = -32603;

/// Geth-style nodes answer gas estimation and calls with a JSON-RPC internal
/// error whose payload nests the real failure under `originalError`, or for
/// some vendors as a direct `data` field.
pub struct InternalErrorExtractor;

impl RevertExtractor for InternalErrorExtractor {
    fn name(&self) -> &'static str {
        "internal_error"
    }

    fn try_extract(&self, error: &Value) -> Option<Extraction> {
        if numeric_code(error) != Some(INTERNAL_ERROR_CODE) {
            return None;
        }

        let payload = error.get("data")?;
        let revert_data = payload
            .get("originalError")
            .and_then(|original| original.get("data"))
            .or_else(|| payload.get("data"))
            .and_then(parse_revert_bytes);

        Some(Extraction::Resolved(RevertInfo {
            revert_data,
            txn_request: None,
        }))
    }
}
