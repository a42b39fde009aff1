use chainpack_ethereum::ArtifactTree;

use crate::decode::decode_custom;

/// Searches the artifact tree for a contract whose interface decodes the
/// revert payload.
///
/// Depth-first: a node's own contracts in key order first, then its imports
/// in key order, recursively. The found contract's name is qualified with the
/// dotted chain of import names, e.g. `X.C` for contract `C` inside import
/// `X`. First success anywhere wins.
pub fn resolve_revert(tree: &ArtifactTree, data: &[u8]) -> Option<(String, String)> {
    for (name, contract) in &tree.contracts {
        if let Some(message) = decode_custom(data, &contract.abi) {
            return Some((name.clone(), message));
        }
    }

    for (prefix, import) in &tree.imports {
        if let Some((name, message)) = resolve_revert(import, data) {
            return Some((format!("{prefix}.{name}"), message));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use alloy_dyn_abi::DynSolValue;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::{Address, U256};
    use chainpack_ethereum::ContractData;
    use serde_json::json;

    use super::*;

    fn contract_with(errors: serde_json::Value) -> ContractData {
        ContractData {
            address: Address::ZERO,
            abi: serde_json::from_value::<JsonAbi>(errors).unwrap(),
        }
    }

    fn empty_contract() -> ContractData {
        contract_with(json!([]))
    }

    fn limit_exceeded_abi() -> serde_json::Value {
        json!([{
            "type": "error",
            "name": "LimitExceeded",
            "inputs": [{"name": "limit", "type": "uint256"}]
        }])
    }

    fn limit_exceeded_data(contract: &ContractData) -> Vec<u8> {
        let error = contract.abi.errors().next().unwrap();
        let mut data = error.selector().to_vec();
        data.extend(DynSolValue::Tuple(vec![DynSolValue::Uint(U256::from(7), 256)]).abi_encode_params());
        data
    }

    mod resolve_revert {
        use super::*;

        #[test]
        fn should_qualify_contract_found_inside_import() {
            let matching = contract_with(limit_exceeded_abi());
            let data = limit_exceeded_data(&matching);

            let mut import = ArtifactTree::default();
            import.contracts.insert("C".to_string(), matching);

            let mut tree = ArtifactTree::default();
            tree.contracts.insert("A".to_string(), empty_contract());
            tree.contracts.insert("B".to_string(), empty_contract());
            tree.imports.insert("X".to_string(), import);

            let (name, message) = resolve_revert(&tree, &data).unwrap();

            assert_eq!(name, "X.C");
            assert_eq!(message, "LimitExceeded(7)");
        }

        #[test]
        fn should_prefer_own_contracts_over_imports() {
            let own = contract_with(limit_exceeded_abi());
            let data = limit_exceeded_data(&own);

            let mut import = ArtifactTree::default();
            import
                .contracts
                .insert("Shadow".to_string(), contract_with(limit_exceeded_abi()));

            let mut tree = ArtifactTree::default();
            tree.contracts.insert("Own".to_string(), own);
            tree.imports.insert("X".to_string(), import);

            let (name, _) = resolve_revert(&tree, &data).unwrap();

            assert_eq!(name, "Own");
        }

        #[test]
        fn should_return_none_when_nothing_matches() {
            let mut tree = ArtifactTree::default();
            tree.contracts.insert("A".to_string(), empty_contract());

            assert!(resolve_revert(&tree, &[0xde, 0xad, 0xbe, 0xef]).is_none());
        }
    }
}
