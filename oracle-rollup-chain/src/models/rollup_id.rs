use crate::models::BlockHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies this rollup to the sequencer network: sha256 of the configured
/// rollup name.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RollupId(BlockHash);

impl RollupId {
    pub fn from_name(name: &str) -> Self {
        Self(BlockHash::digest(name.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for RollupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for RollupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RollupId({})", self.0)
    }
}
