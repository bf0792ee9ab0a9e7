use crate::models::{Block, CommitmentState};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The chain as shared between tasks. Writers hold the write guard for the
/// whole check-then-mutate sequence; multi-field reads use one read guard.
pub type SharedChain = Arc<RwLock<ChainStore>>;

/// Append-only block sequence plus the soft/firm commitment heights.
///
/// Always holds at least the genesis block, and both commitment heights
/// always point at an existing block.
#[derive(Debug, Clone)]
pub struct ChainStore {
    blocks: Vec<Block>,
    soft: u32,
    firm: u32,
}

impl ChainStore {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
            soft: 0,
            firm: 0,
        }
    }

    pub fn new_shared() -> SharedChain {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Number of blocks including genesis. Also the height the next block
    /// will be appended at.
    pub fn block_count(&self) -> u32 {
        self.blocks.len() as u32
    }

    pub fn get_block(&self, height: u32) -> Result<&Block> {
        self.blocks
            .get(height as usize)
            .ok_or(Error::NotFound(height))
    }

    pub fn latest_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn soft_block(&self) -> &Block {
        &self.blocks[self.soft as usize]
    }

    pub fn firm_block(&self) -> &Block {
        &self.blocks[self.firm as usize]
    }

    pub fn soft_height(&self) -> u32 {
        self.soft
    }

    pub fn firm_height(&self) -> u32 {
        self.firm
    }

    pub fn commitment_state(&self) -> CommitmentState {
        CommitmentState {
            soft: self.soft_block().clone(),
            firm: self.firm_block().clone(),
        }
    }

    /// Parent linkage is the caller's responsibility.
    pub fn append(&mut self, block: Block) {
        debug_assert_eq!(block.height, self.block_count());
        self.blocks.push(block);
    }

    /// Callers resolve both heights against the chain before calling.
    pub fn set_commitment(&mut self, soft_height: u32, firm_height: u32) {
        debug_assert!(soft_height < self.block_count());
        debug_assert!(firm_height < self.block_count());
        self.soft = soft_height;
        self.firm = firm_height;
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter()
    }
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}
