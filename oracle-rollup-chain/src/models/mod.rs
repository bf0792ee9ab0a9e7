pub mod block;
pub mod block_hash;
pub mod commitment;
pub mod rollup_id;
pub mod transaction;

pub use block::Block;
pub use block_hash::BlockHash;
pub use commitment::CommitmentState;
pub use rollup_id::RollupId;
pub use transaction::{FinalizedBlockData, Transaction};
