use crate::error::ExecutionError;
use crate::methods::{ExecutionApi, Result};
use crate::types::{BlockIdentifier, CommitmentUpdate, ExecutedBlock, GenesisInfo, HealthResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oracle_rollup_chain::{Block, BlockHash, ChainStore, CommitmentState, SharedChain, Transaction};
use tokio::sync::broadcast;

const BLOCK_CHANNEL_CAPACITY: usize = 1024;

/// Serves the execution protocol over a shared chain.
///
/// `execute_block` and `update_commitment_state` each run entirely under the
/// chain write guard; every read takes a single read guard, so a caller never
/// observes a half-applied mutation.
pub struct ExecutionService {
    chain: SharedChain,
    genesis: GenesisInfo,
    blocks_tx: broadcast::Sender<Block>,
}

impl ExecutionService {
    pub fn new(chain: SharedChain, genesis: GenesisInfo) -> Self {
        let (blocks_tx, _) = broadcast::channel(BLOCK_CHANNEL_CAPACITY);
        Self {
            chain,
            genesis,
            blocks_tx,
        }
    }

    pub fn chain(&self) -> SharedChain {
        self.chain.clone()
    }

    /// Receives every block appended after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<Block> {
        self.blocks_tx.subscribe()
    }

    fn resolve(store: &ChainStore, identifier: &BlockIdentifier) -> Result<Block> {
        match identifier {
            BlockIdentifier::Number(height) => Ok(store.get_block(*height)?.clone()),
            BlockIdentifier::Hash(hash) => Err(ExecutionError::InvalidIdentifier(format!(
                "lookup by hash is not supported ({hash})"
            ))),
        }
    }
}

#[async_trait]
impl ExecutionApi for ExecutionService {
    async fn get_genesis_info(&self) -> Result<GenesisInfo> {
        log::debug!("getGenesisInfo -> rollup {}", self.genesis.rollup_id);
        Ok(self.genesis.clone())
    }

    async fn get_block(&self, identifier: BlockIdentifier) -> Result<Block> {
        let store = self.chain.read().await;
        let block = Self::resolve(&store, &identifier)?;
        log::debug!("getBlock {:?} -> {}", identifier, block.hash);
        Ok(block)
    }

    async fn batch_get_blocks(&self, identifiers: Vec<BlockIdentifier>) -> Result<Vec<Block>> {
        let store = self.chain.read().await;
        let blocks = identifiers
            .iter()
            .map(|id| Self::resolve(&store, id))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("batchGetBlocks -> {} blocks", blocks.len());
        Ok(blocks)
    }

    async fn execute_block(
        &self,
        prev_block_hash: BlockHash,
        transactions: Vec<Vec<u8>>,
        timestamp: DateTime<Utc>,
    ) -> Result<ExecutedBlock> {
        log::debug!(
            "executeBlock prev {} with {} transactions",
            prev_block_hash,
            transactions.len()
        );

        let mut store = self.chain.write().await;
        let latest = store.latest_block().hash;
        if prev_block_hash != latest {
            return Err(ExecutionError::ParentMismatch {
                expected: latest,
                got: prev_block_hash,
            });
        }

        let txs = transactions
            .iter()
            .map(|bytes| Transaction::decode(bytes))
            .collect::<oracle_rollup_chain::Result<Vec<_>>>()?;

        if txs.is_empty() {
            log::debug!("executeBlock: no transactions, chain unchanged");
            return Ok(ExecutedBlock::Empty);
        }

        let block = Block::new(prev_block_hash, store.block_count(), txs, timestamp)?;
        store.append(block.clone());
        // Published under the write guard so subscribers see chain order.
        // No receivers is fine.
        let _ = self.blocks_tx.send(block.clone());
        drop(store);

        log::info!(
            "appended block {} at height {} ({} txs)",
            block.hash,
            block.height,
            block.transactions.len()
        );
        Ok(ExecutedBlock::Appended(block))
    }

    async fn get_commitment_state(&self) -> Result<CommitmentState> {
        let state = self.chain.read().await.commitment_state();
        log::debug!(
            "getCommitmentState -> soft {} firm {}",
            state.soft.height,
            state.firm.height
        );
        Ok(state)
    }

    async fn update_commitment_state(&self, update: CommitmentUpdate) -> Result<CommitmentState> {
        log::debug!(
            "updateCommitmentState soft {}@{} firm {}@{}",
            update.soft.hash,
            update.soft.number,
            update.firm.hash,
            update.firm.number
        );

        let mut store = self.chain.write().await;

        let firm = store.get_block(update.firm.number)?;
        if firm.hash != update.firm.hash {
            return Err(ExecutionError::FirmHashMismatch {
                height: update.firm.number,
                expected: firm.hash,
                got: update.firm.hash,
            });
        }

        let soft = store.get_block(update.soft.number)?;
        if soft.hash != update.soft.hash {
            return Err(ExecutionError::SoftHashMismatch {
                height: update.soft.number,
                expected: soft.hash,
                got: update.soft.hash,
            });
        }

        if update.firm.number > update.soft.number {
            log::warn!(
                "firm commitment {} is ahead of soft commitment {}",
                update.firm.number,
                update.soft.number
            );
        }

        store.set_commitment(update.soft.number, update.firm.number);
        Ok(store.commitment_state())
    }

    async fn health(&self) -> Result<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            height: self.chain.read().await.block_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockRef;
    use oracle_rollup_chain::{FinalizedBlockData, RollupId};

    fn service() -> ExecutionService {
        ExecutionService::new(
            ChainStore::new_shared(),
            GenesisInfo::new(RollupId::from_name("test-rollup")),
        )
    }

    fn encoded(slot: u64) -> Vec<u8> {
        Transaction::new(FinalizedBlockData {
            slot,
            ..Default::default()
        })
        .encode()
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_execution_leaves_chain_unchanged() {
        let service = service();
        let genesis = Block::genesis();
        let result = service
            .execute_block(genesis.hash, Vec::new(), Utc::now())
            .await
            .unwrap();
        assert_eq!(result, ExecutedBlock::Empty);
        assert_eq!(service.chain().read().await.block_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_transaction_does_not_append() {
        let service = service();
        let err = service
            .execute_block(
                Block::genesis().hash,
                vec![encoded(1), b"{not json".to_vec()],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::MalformedTransaction(_)));
        assert_eq!(service.chain().read().await.block_count(), 1);
    }

    #[tokio::test]
    async fn test_append_notifies_subscribers() {
        let service = service();
        let mut rx = service.subscribe();
        let executed = service
            .execute_block(Block::genesis().hash, vec![encoded(1)], Utc::now())
            .await
            .unwrap();
        let block = executed.block().cloned().unwrap();
        assert_eq!(rx.recv().await.unwrap(), block);
    }

    #[tokio::test]
    async fn test_hash_lookup_is_invalid() {
        let service = service();
        let err = service
            .get_block(BlockIdentifier::Hash(Block::genesis().hash))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_soft_hash_is_checked() {
        let service = service();
        let block = service
            .execute_block(Block::genesis().hash, vec![encoded(1)], Utc::now())
            .await
            .unwrap()
            .block()
            .cloned()
            .unwrap();

        let err = service
            .update_commitment_state(CommitmentUpdate {
                soft: BlockRef {
                    number: 1,
                    hash: BlockHash::digest(b"wrong"),
                },
                firm: BlockRef::from(&block),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::SoftHashMismatch { height: 1, .. }));

        let state = service.get_commitment_state().await.unwrap();
        assert_eq!(state.soft.height, 0);
        assert_eq!(state.firm.height, 0);
    }

    #[tokio::test]
    async fn test_health_reports_block_count() {
        let service = service();
        let health = service.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.height, 1);
    }
}
