use serde_json::Value;

use crate::classify::{parse_revert_bytes, Extraction, RevertExtractor, RevertInfo};

const CALL_EXCEPTION_CODE: &str = "CALL_EXCEPTION";

/// Call-exception style errors carry everything we want in-band: the
/// transaction request that failed and the raw revert payload.
pub struct CallExceptionExtractor;

impl RevertExtractor for CallExceptionExtractor {
    fn name(&self) -> &'static str {
        "call_exception"
    }

    fn try_extract(&self, error: &Value) -> Option<Extraction> {
        if error.get("code").and_then(Value::as_str) != Some(CALL_EXCEPTION_CODE) {
            return None;
        }

        Some(Extraction::Resolved(RevertInfo {
            revert_data: error.get("data").and_then(parse_revert_bytes),
            txn_request: error
                .get("transaction")
                .cloned()
                .and_then(|t| serde_json::from_value(t).ok()),
        }))
    }
}
