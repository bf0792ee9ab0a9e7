use crate::models::{BlockHash, Transaction};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub parent_hash: BlockHash,
    pub hash: BlockHash,
    pub height: u32,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        parent_hash: BlockHash,
        height: u32,
        transactions: Vec<Transaction>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let hash = Self::content_hash(&transactions)?;
        Ok(Self {
            parent_hash,
            hash,
            height,
            timestamp,
            transactions,
        })
    }

    /// Empty transaction set, zero parent, height 0, unix epoch timestamp.
    pub fn genesis() -> Self {
        Self {
            parent_hash: BlockHash::ZERO,
            hash: BlockHash::digest(&[]),
            height: 0,
            timestamp: DateTime::<Utc>::default(),
            transactions: Vec::new(),
        }
    }

    /// sha256 over the concatenated canonical encodings, in order, with no
    /// separators. Parent hash and height are not part of the input, so the
    /// same transactions at two positions produce the same hash.
    pub fn content_hash(transactions: &[Transaction]) -> Result<BlockHash> {
        let mut data = Vec::new();
        for tx in transactions {
            data.extend_from_slice(&tx.encode()?);
        }
        Ok(BlockHash::digest(&data))
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }
}
