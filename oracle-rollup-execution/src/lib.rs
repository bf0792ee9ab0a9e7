//! Execution protocol for the oracle rollup.
//!
//! [`ExecutionService`] applies the protocol to a shared chain; the
//! JSON-RPC [`ExecutionRpcServer`] exposes it to an external conductor and
//! [`ExecutionRpcClient`] speaks to such a server.

pub mod client;
pub mod error;
pub mod methods;
pub mod server;
pub mod service;
pub mod types;

pub use client::ExecutionRpcClient;
pub use error::ExecutionError;
pub use methods::{dispatch_request, method_names, ExecutionApi, Result};
pub use server::ExecutionRpcServer;
pub use service::ExecutionService;
pub use types::*;

/// Default listen address of the execution RPC server.
pub const DEFAULT_ADDR: &str = "127.0.0.1:50051";
