//! Oracle rollup node: polls the beacon chain, sequences each observation
//! through the shared sequencer and serves the execution protocol plus a
//! read-side query API over the resulting chain.

pub mod config;
pub mod constants;
pub mod feed;
pub mod logging;
pub mod node;
pub mod oracle;
pub mod query;

pub use config::{Config, NodeConfig};
pub use node::Node;
