//! Consensus Binder (component E): ties a layer's declared state-tree
//! anchor to the `app_hash` actually committed at the following height.

use crate::client::ConsensusClient;
use crate::error::ConsensusError;
use certen_types::Hash32;
use tracing::{debug, warn};

/// Fetch the commit at `height` and require its `app_hash` to equal
/// `expected`.
///
/// Applied twice per chained proof: once binding `layer1.bvn_minor_block_index
/// + 1` to `layer2.bvn_state_tree_anchor`, and once binding
/// `layer2.dn_minor_block_index + 1` to `layer3.dn_state_tree_anchor`. A
/// proof lacking either bind is not proof-grade (see
/// [`crate::chained::VerifyMode`]).
pub async fn bind_app_hash(
    client: &dyn ConsensusClient,
    height: u64,
    expected: Hash32,
) -> Result<(), ConsensusError> {
    let header = client.commit(height).await?;

    if header.app_hash.is_empty() {
        warn!(height, "commit has an empty app_hash");
        return Err(ConsensusError::EmptyAppHash { height });
    }

    if header.app_hash != expected.as_bytes() {
        warn!(height, expected = %expected.to_hex(), actual = %hex::encode(&header.app_hash), "app_hash mismatch");
        return Err(ConsensusError::AppHashMismatch {
            height,
            expected: expected.to_hex(),
            actual: hex::encode(&header.app_hash),
        });
    }

    debug!(height, "app_hash bound successfully");
    Ok(())
}
