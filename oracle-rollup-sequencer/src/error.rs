use thiserror::Error;

/// Failure to reach the sequencer network or to make sense of its reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sequencer RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Failed to encode transaction: {0}")]
    Encode(#[from] oracle_rollup_chain::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Submission rejected with code {code}: {log}")]
    SubmissionRejected { code: u32, log: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Nonce conflict persisted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}
