use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A compiled contract as stored in a deployment artifact.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContractData {
    pub address: Address,
    pub abi: JsonAbi,
}

/// Recursive artifact tree of a package: its own contracts plus the trees of
/// the packages it imports, both keyed by name.
///
/// The tree is owned by the build orchestration layer and only ever borrowed
/// by diagnosis, which treats it as an immutable view. Map iteration order is
/// insertion order, which makes any search over the tree deterministic.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ArtifactTree {
    #[serde(default)]
    pub contracts: IndexMap<String, ContractData>,

    #[serde(default)]
    pub imports: IndexMap<String, ArtifactTree>,
}

impl ArtifactTree {
    /// Depth-first search for the contract deployed at `address`, own
    /// contracts before imports. Returns the dotted qualified name, e.g.
    /// `X.C` for contract `C` inside import `X`.
    pub fn find_by_address(&self, address: Address) -> Option<(String, &ContractData)> {
        for (name, contract) in &self.contracts {
            if contract.address == address {
                return Some((name.clone(), contract));
            }
        }

        for (prefix, import) in &self.imports {
            if let Some((name, contract)) = import.find_by_address(address) {
                return Some((format!("{prefix}.{name}"), contract));
            }
        }

        None
    }
}
