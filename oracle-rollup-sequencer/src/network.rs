use crate::envelope::SignedTransaction;
use crate::signer::Address;
use crate::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a synchronous broadcast as reported by the sequencer network.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastTxResult {
    pub code: u32,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub log: String,
}

impl BroadcastTxResult {
    pub fn is_ok(&self) -> bool {
        self.code == crate::SUCCESS_CODE
    }
}

/// The two calls the submission client needs from the sequencer network.
#[async_trait]
pub trait SequencerNetwork: Send + Sync {
    async fn broadcast_tx_sync(
        &self,
        tx: &SignedTransaction,
    ) -> Result<BroadcastTxResult, TransportError>;

    async fn get_nonce(&self, address: &Address) -> Result<u32, TransportError>;
}
