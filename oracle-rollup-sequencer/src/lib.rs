//! Delivery of rollup transactions to the shared sequencer network.
//!
//! A [`SequencerClient`] wraps each transaction in a signed envelope tagged
//! with the rollup id and broadcasts it, refreshing its cached nonce and
//! retrying when the network reports a nonce conflict.

mod error;

pub mod client;
pub mod comet;
pub mod envelope;
pub mod json_stringify_deterministic;
pub mod network;
pub mod signer;

pub use client::{RetryPolicy, SequencerClient, NONCE_CONFLICT_CODE, SUCCESS_CODE};
pub use comet::CometHttpNetwork;
pub use envelope::{Action, SignedTransaction, UnsignedTransaction};
pub use error::{SequencerError, TransportError};
pub use network::{BroadcastTxResult, SequencerNetwork};
pub use signer::{Address, Signer};

pub type Result<T> = std::result::Result<T, SequencerError>;
