use serde_json::Value;

use crate::classify::{Extraction, RevertExtractor};

const GAS_ESTIMATION_CODE: &str = "UNPREDICTABLE_GAS_LIMIT";
const GAS_ESTIMATION_MESSAGE: &str = "cannot estimate gas";

/// Client libraries report a failed gas estimation as their own error with
/// the node's actual failure tucked into an `error` field. Nothing useful
/// lives at the top level, so hand the inner error back for another round of
/// classification.
pub struct GasEstimationExtractor;

impl RevertExtractor for GasEstimationExtractor {
    fn name(&self) -> &'static str {
        "gas_estimation"
    }

    fn try_extract(&self, error: &Value) -> Option<Extraction> {
        let by_code = error.get("code").and_then(Value::as_str) == Some(GAS_ESTIMATION_CODE);
        let by_message = error
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|m| m.to_lowercase().contains(GAS_ESTIMATION_MESSAGE));

        if !by_code && !by_message {
            return None;
        }

        Some(Extraction::Nested(error.get("error")?.clone()))
    }
}
