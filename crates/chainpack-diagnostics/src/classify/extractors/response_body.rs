use serde_json::Value;

use crate::classify::{parse_revert_bytes, Extraction, RevertExtractor, RevertInfo};

const PROCESSING_RESPONSE_MESSAGE: &str = "processing response error";

/// Transport-level wrappers that report "error while processing response"
/// keep the original JSON-RPC request body alongside the node's error. The
/// transaction request is recovered by re-parsing that body; the revert
/// payload sits in the error's own `data` field.
pub struct ResponseBodyExtractor;

impl RevertExtractor for ResponseBodyExtractor {
    fn name(&self) -> &'static str {
        "response_body"
    }

    fn try_extract(&self, error: &Value) -> Option<Extraction> {
        let matches_message = error
            .get("message")
            .and_then(Value::as_str)
            .is_some_and(|m| m.to_lowercase().contains(PROCESSING_RESPONSE_MESSAGE));

        let body = error.get("requestBody").and_then(Value::as_str);
        if !matches_message && body.is_none() {
            return None;
        }

        let txn_request = body
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
            .and_then(|request| request.get("params")?.get(0).cloned())
            .and_then(|params| serde_json::from_value(params).ok());

        Some(Extraction::Resolved(RevertInfo {
            revert_data: error.get("data").and_then(parse_revert_bytes),
            txn_request,
        }))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use serde_json::json;

    use super::*;

    mod try_extract {
        use super::*;

        #[test]
        fn should_recover_request_from_body_and_data_from_error() {
            let body = json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "eth_call",
                "params": [{"from": "0x1111111111111111111111111111111111111111",
                            "to": "0x2222222222222222222222222222222222222222",
                            "data": "0xcfae3217"}, "latest"]
            });
            let error = json!({
                "message": "processing response error",
                "requestBody": body.to_string(),
                "data": "0x08c379a0"
            });

            let Some(Extraction::Resolved(info)) = ResponseBodyExtractor.try_extract(&error) else {
                panic!("expected resolved extraction");
            };

            assert_eq!(info.revert_data, Some("0x08c379a0".parse().unwrap()));
            assert_eq!(info.txn_request.unwrap().from, Some(Address::repeat_byte(0x11)));
        }

        #[test]
        fn should_tolerate_unparseable_body() {
            let error = json!({
                "message": "processing response error",
                "requestBody": "not json",
                "data": "0xdeadbeef"
            });

            let Some(Extraction::Resolved(info)) = ResponseBodyExtractor.try_extract(&error) else {
                panic!("expected resolved extraction");
            };

            assert!(info.txn_request.is_none());
            assert!(info.revert_data.is_some());
        }

        #[test]
        fn should_decline_unrelated_errors() {
            let error = json!({"message": "connection refused"});

            assert!(ResponseBodyExtractor.try_extract(&error).is_none());
        }
    }
}
