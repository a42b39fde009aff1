use chainpack_ethereum::{ArtifactTree, TraceAction, TraceEntry};

/// Turns an ordered trace into report text.
///
/// The exact layout belongs to the consumer; diagnosis only needs some
/// rendering to attach. [`PlainTraceRenderer`] is the built-in fallback.
pub trait TraceRenderer: Send + Sync {
    fn render(&self, entries: &[TraceEntry], artifacts: &ArtifactTree) -> String;
}

/// One line per frame, indented by call depth, contract names substituted
/// from the artifact tree where the callee address is known.
pub struct PlainTraceRenderer;

impl TraceRenderer for PlainTraceRenderer {
    fn render(&self, entries: &[TraceEntry], artifacts: &ArtifactTree) -> String {
        let mut lines = Vec::with_capacity(entries.len());

        for entry in entries {
            let indent = "  ".repeat(entry.trace_address.len());
            let line = match &entry.action {
                TraceAction::Call(call) => {
                    let callee = artifacts
                        .find_by_address(call.to)
                        .map(|(name, _)| name)
                        .unwrap_or_else(|| call.to.to_string());

                    match &entry.result {
                        Some(result) => format!("{indent}call {callee} (gas used: {})", result.gas_used),
                        None => format!("{indent}call {callee} (no result)"),
                    }
                },
                TraceAction::Create(create) => format!("{indent}create from {}", create.from),
            };
            lines.push(line);
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::{Address, Bytes, B256, U256};
    use chainpack_ethereum::{CallAction, ContractData, TraceKind, TraceResult};

    use super::*;

    fn call_entry(to: Address, trace_address: Vec<usize>) -> TraceEntry {
        TraceEntry {
            action: TraceAction::Call(CallAction {
                from: Address::ZERO,
                to,
                gas: U256::from(100_000),
                input: Bytes::new(),
                value: U256::ZERO,
                call_type: Some("call".to_string()),
            }),
            result: Some(TraceResult {
                gas_used: U256::from(21_000),
                output: Bytes::new(),
                code: None,
            }),
            subtraces: 0,
            trace_address,
            transaction_hash: B256::ZERO,
            kind: TraceKind::Call,
        }
    }

    mod render {
        use super::*;

        #[test]
        fn should_indent_frames_by_depth_and_name_known_contracts() {
            let address = Address::repeat_byte(0x11);
            let mut artifacts = ArtifactTree::default();
            artifacts.contracts.insert(
                "Wallet".to_string(),
                ContractData {
                    address,
                    abi: JsonAbi::new(),
                },
            );

            let entries = vec![call_entry(address, vec![]), call_entry(Address::repeat_byte(0x22), vec![0])];

            let text = PlainTraceRenderer.render(&entries, &artifacts);

            let lines: Vec<_> = text.lines().collect();
            assert!(lines[0].starts_with("call Wallet"));
            assert!(lines[1].starts_with("  call 0x2222"));
        }

        #[test]
        fn should_render_empty_trace_as_empty_text() {
            let text = PlainTraceRenderer.render(&[], &ArtifactTree::default());

            assert!(text.is_empty());
        }
    }
}
