use alloy_primitives::{B256, U256};
use chainpack_ethereum::{EthereumClient, TransactionRequest};

use crate::Degradation;

/// Gas limit forced onto replayed transactions so they mine even on revert
/// and a receipt/trace becomes obtainable.
pub const REPLAY_GAS_LIMIT: u64 = 10_000_000;

/// Re-executes a failed call on a local development chain to obtain a mined
/// transaction hash.
///
/// The sender is impersonated through the node's debugging RPC, so no key
/// material is needed. Only the hash matters; whether the replay succeeds or
/// reverts again is irrelevant, and mining is never awaited.
pub(crate) async fn replay(client: &EthereumClient, request: &TransactionRequest) -> Result<B256, Degradation> {
    let development = client
        .is_development_chain()
        .await
        .map_err(|e| Degradation::ReplayUnavailable(e.to_string()))?;

    if !development {
        return Err(Degradation::ReplayUnavailable(
            "connected node is not a local development chain".to_string(),
        ));
    }

    let from = request
        .from
        .ok_or_else(|| Degradation::ReplayUnavailable("transaction request has no sender".to_string()))?;

    let mut request = request.clone();
    request.gas = Some(U256::from(REPLAY_GAS_LIMIT));

    client
        .impersonate(from)
        .await
        .map_err(|e| Degradation::ReplayUnavailable(e.to_string()))?;

    client
        .send_transaction(&request)
        .await
        .map_err(|e| Degradation::ReplayUnavailable(e.to_string()))
}
