//! Request and response structures for the execution protocol

use chrono::{DateTime, Utc};
use oracle_rollup_chain::{Block, BlockHash, RollupId};
use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: i64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: RpcId::Number(id),
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: RpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: RpcId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: RpcId, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    String(String),
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// Execution protocol types
// ============================================================================

/// Static parameters a driver needs before it starts executing blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenesisInfo {
    pub rollup_id: RollupId,
    pub sequencer_genesis_block_height: u32,
    pub celestia_base_block_height: u32,
    pub celestia_block_variance: u32,
}

impl GenesisInfo {
    pub fn new(rollup_id: RollupId) -> Self {
        Self {
            rollup_id,
            sequencer_genesis_block_height: 1,
            celestia_base_block_height: 1,
            celestia_block_variance: 1,
        }
    }
}

/// `{"number": n}` or `{"hash": "<hex>"}`. Only lookups by number are served.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockIdentifier {
    Number(u32),
    Hash(BlockHash),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockRef {
    pub number: u32,
    pub hash: BlockHash,
}

impl From<&Block> for BlockRef {
    fn from(block: &Block) -> Self {
        Self {
            number: block.height,
            hash: block.hash,
        }
    }
}

/// Requested soft and firm commitment positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitmentUpdate {
    pub soft: BlockRef,
    pub firm: BlockRef,
}

/// Result of `executeBlock`. An empty transaction list appends nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "block", rename_all = "snake_case")]
pub enum ExecutedBlock {
    Appended(Block),
    Empty,
}

impl ExecutedBlock {
    pub fn block(&self) -> Option<&Block> {
        match self {
            Self::Appended(block) => Some(block),
            Self::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockParams {
    pub identifier: BlockIdentifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchGetBlocksParams {
    pub identifiers: Vec<BlockIdentifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchGetBlocksResponse {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteBlockParams {
    pub prev_block_hash: BlockHash,
    /// Encoded rollup transactions, base64 on the wire.
    #[serde(with = "base64_list")]
    pub transactions: Vec<Vec<u8>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommitmentStateParams {
    pub commitment_state: CommitmentUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub height: u32,
}

mod base64_list {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&STANDARD.encode(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|s| STANDARD.decode(s).map_err(de::Error::custom))
            .collect()
    }
}
