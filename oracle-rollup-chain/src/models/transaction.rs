use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One finalized beacon-chain head as reported by the oracle feed. The chain
/// never interprets these fields; missing ones decode as zero values.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct FinalizedBlockData {
    pub block_hash: String,
    pub state_root: String,
    pub parent_root: String,
    pub slot: u64,
    pub proposer_index: u64,
}

/// A rollup transaction wrapping a single [`FinalizedBlockData`] record.
///
/// The canonical byte form is compact JSON with fields in declaration order,
/// so two transactions compare equal exactly when their encodings do.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "ethBlockData")]
    pub eth_block_data: FinalizedBlockData,
}

impl Transaction {
    pub fn new(eth_block_data: FinalizedBlockData) -> Self {
        Self { eth_block_data }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedTransaction(e.to_string()))
    }
}

impl From<FinalizedBlockData> for Transaction {
    fn from(eth_block_data: FinalizedBlockData) -> Self {
        Self::new(eth_block_data)
    }
}
