use serde_json::Value;

use crate::classify::{numeric_code, Extraction, RevertExtractor, RevertInfo};

/// Parity-era nodes answer with this code and bury the revert payload in the
/// message text, e.g. `VM execution error. Reverted 0x08c379a0...`.
const LEGACY_REVERT_CODE: i64 = -32015;

pub struct LegacyRevertExtractor;

impl RevertExtractor for LegacyRevertExtractor {
    fn name(&self) -> &'static str {
        "legacy_revert"
    }

    fn try_extract(&self, error: &Value) -> Option<Extraction> {
        if numeric_code(error) != Some(LEGACY_REVERT_CODE) {
            return None;
        }

        let revert_data = error
            .get("message")
            .and_then(Value::as_str)
            .and_then(|message| message.rsplit(' ').next())
            .filter(|token| token.starts_with("0x"))
            .and_then(|token| token.parse().ok());

        Some(Extraction::Resolved(RevertInfo {
            revert_data,
            txn_request: None,
        }))
    }
}
