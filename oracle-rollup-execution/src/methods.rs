//! Execution protocol method names, handler trait and dispatch

use crate::error::ExecutionError;
use crate::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oracle_rollup_chain::{Block, BlockHash, CommitmentState};

pub type Result<T> = std::result::Result<T, ExecutionError>;

pub mod method_names {
    pub const GET_GENESIS_INFO: &str = "getGenesisInfo";
    pub const GET_BLOCK: &str = "getBlock";
    pub const BATCH_GET_BLOCKS: &str = "batchGetBlocks";
    pub const EXECUTE_BLOCK: &str = "executeBlock";
    pub const GET_COMMITMENT_STATE: &str = "getCommitmentState";
    pub const UPDATE_COMMITMENT_STATE: &str = "updateCommitmentState";
}

/// The operations a conductor drives the rollup with. Implemented by the
/// in-process [`crate::ExecutionService`] and by the remote
/// [`crate::ExecutionRpcClient`].
#[async_trait]
pub trait ExecutionApi: Send + Sync {
    async fn get_genesis_info(&self) -> Result<GenesisInfo>;

    async fn get_block(&self, identifier: BlockIdentifier) -> Result<Block>;

    async fn batch_get_blocks(&self, identifiers: Vec<BlockIdentifier>) -> Result<Vec<Block>>;

    async fn execute_block(
        &self,
        prev_block_hash: BlockHash,
        transactions: Vec<Vec<u8>>,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutedBlock>;

    async fn get_commitment_state(&self) -> Result<CommitmentState>;

    async fn update_commitment_state(&self, update: CommitmentUpdate) -> Result<CommitmentState>;

    async fn health(&self) -> Result<HealthResponse>;
}

fn params<T: serde::de::DeserializeOwned>(request: &RpcRequest) -> Result<T> {
    serde_json::from_value(request.params.clone())
        .map_err(|e| ExecutionError::InvalidParams(e.to_string()))
}

pub async fn dispatch_request<H: ExecutionApi + ?Sized>(
    handler: &H,
    request: &RpcRequest,
) -> Result<serde_json::Value> {
    use method_names::*;

    match request.method.as_str() {
        GET_GENESIS_INFO => {
            let result = handler.get_genesis_info().await?;
            Ok(serde_json::to_value(result)?)
        }

        GET_BLOCK => {
            let params: GetBlockParams = params(request)?;
            let result = handler.get_block(params.identifier).await?;
            Ok(serde_json::to_value(result)?)
        }

        BATCH_GET_BLOCKS => {
            let params: BatchGetBlocksParams = params(request)?;
            let blocks = handler.batch_get_blocks(params.identifiers).await?;
            Ok(serde_json::to_value(BatchGetBlocksResponse { blocks })?)
        }

        EXECUTE_BLOCK => {
            let params: ExecuteBlockParams = params(request)?;
            let result = handler
                .execute_block(params.prev_block_hash, params.transactions, params.timestamp)
                .await?;
            Ok(serde_json::to_value(result)?)
        }

        GET_COMMITMENT_STATE => {
            let result = handler.get_commitment_state().await?;
            Ok(serde_json::to_value(result)?)
        }

        UPDATE_COMMITMENT_STATE => {
            let params: UpdateCommitmentStateParams = params(request)?;
            let result = handler
                .update_commitment_state(params.commitment_state)
                .await?;
            Ok(serde_json::to_value(result)?)
        }

        _ => Err(ExecutionError::MethodNotFound(request.method.clone())),
    }
}
