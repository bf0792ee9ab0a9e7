//! Rollup chain state: blocks, transactions and the soft/firm commitment
//! pointers.
//!
//! Everything here is plain data plus invariant checks. Callers that share a
//! chain between tasks go through [`SharedChain`], which is the single
//! exclusion region for all reads and writes.

mod error;

pub mod chain_store;
pub mod models;

pub use chain_store::{ChainStore, SharedChain};
pub use error::Error;
pub use models::{Block, BlockHash, CommitmentState, FinalizedBlockData, RollupId, Transaction};

pub type Result<T> = std::result::Result<T, Error>;
