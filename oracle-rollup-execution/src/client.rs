//! HTTP client for a remote execution protocol server

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oracle_rollup_chain::{Block, BlockHash, CommitmentState};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ExecutionError;
use crate::methods::{method_names, ExecutionApi, Result};
use crate::types::*;

/// Typed calls against an [`crate::ExecutionRpcServer`]. Application error
/// codes come back as the matching [`ExecutionError`] variant.
pub struct ExecutionRpcClient {
    client: reqwest::Client,
    url: String,
    request_id: AtomicI64,
}

impl ExecutionRpcClient {
    /// `url` is the server base, e.g. `http://127.0.0.1:50051`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            request_id: AtomicI64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        let response: RpcResponse = self
            .client
            .post(format!("{}/", self.url))
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ExecutionError::from_rpc_error(error));
        }
        let result = response
            .result
            .ok_or_else(|| ExecutionError::Transport(format!("{method}: response without result")))?;
        serde_json::from_value(result)
            .map_err(|e| ExecutionError::Transport(format!("{method}: {e}")))
    }
}

#[async_trait]
impl ExecutionApi for ExecutionRpcClient {
    async fn get_genesis_info(&self) -> Result<GenesisInfo> {
        self.call(method_names::GET_GENESIS_INFO, json!({})).await
    }

    async fn get_block(&self, identifier: BlockIdentifier) -> Result<Block> {
        self.call(
            method_names::GET_BLOCK,
            serde_json::to_value(GetBlockParams { identifier })?,
        )
        .await
    }

    async fn batch_get_blocks(&self, identifiers: Vec<BlockIdentifier>) -> Result<Vec<Block>> {
        let response: BatchGetBlocksResponse = self
            .call(
                method_names::BATCH_GET_BLOCKS,
                serde_json::to_value(BatchGetBlocksParams { identifiers })?,
            )
            .await?;
        Ok(response.blocks)
    }

    async fn execute_block(
        &self,
        prev_block_hash: BlockHash,
        transactions: Vec<Vec<u8>>,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutedBlock> {
        let params = ExecuteBlockParams {
            prev_block_hash,
            transactions,
            timestamp,
        };
        self.call(method_names::EXECUTE_BLOCK, serde_json::to_value(params)?)
            .await
    }

    async fn get_commitment_state(&self) -> Result<CommitmentState> {
        self.call(method_names::GET_COMMITMENT_STATE, json!({})).await
    }

    async fn update_commitment_state(&self, update: CommitmentUpdate) -> Result<CommitmentState> {
        let params = UpdateCommitmentStateParams {
            commitment_state: update,
        };
        self.call(
            method_names::UPDATE_COMMITMENT_STATE,
            serde_json::to_value(params)?,
        )
        .await
    }

    async fn health(&self) -> Result<HealthResponse> {
        Ok(self
            .client
            .get(format!("{}/health", self.url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}
