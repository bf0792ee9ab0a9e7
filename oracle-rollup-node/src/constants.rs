//! Defaults for the node's configuration and background tasks.

/// Beacon node (Ethereum consensus layer) base URL
pub const DEFAULT_ETHEREUM_RPC: &str = "http://localhost:8545";

/// CometBFT RPC of the shared sequencer
pub const DEFAULT_SEQUENCER_RPC: &str = "http://localhost:26657";

/// Listen address of the execution RPC server driven by the conductor
pub const DEFAULT_CONDUCTOR_RPC: &str = oracle_rollup_execution::DEFAULT_ADDR;

pub const DEFAULT_ROLLUP_NAME: &str = "blockchain-oracle-rollup";

/// Listen address of the block query / WebSocket server
pub const DEFAULT_RESTAPI_ADDR: &str = "0.0.0.0:8080";

/// Interval between beacon head polls in seconds
pub const ORACLE_POLL_INTERVAL_SECS: u64 = 15;

/// Timeout for a single beacon head request in seconds
pub const ORACLE_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Beacon observations buffered between the poller and the submitter
pub const FEED_CHANNEL_CAPACITY: usize = 64;

pub const BEACON_HEAD_PATH: &str = "/eth/v2/beacon/blocks/head";
