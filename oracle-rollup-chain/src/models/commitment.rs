use crate::models::Block;
use serde::{Deserialize, Serialize};

/// Snapshot of the soft and firm commitment blocks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommitmentState {
    pub soft: Block,
    pub firm: Block,
}
