use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Block not found at height {0}")]
    NotFound(u32),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Invalid block hash: {0}")]
    InvalidHash(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
