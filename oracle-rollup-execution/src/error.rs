//! Execution errors and their JSON-RPC error codes

use crate::types::RpcErrorObject;
use oracle_rollup_chain::BlockHash;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub const NOT_FOUND: i32 = -32001;
    pub const INVALID_IDENTIFIER: i32 = -32002;
    pub const PARENT_MISMATCH: i32 = -32003;
    pub const MALFORMED_TRANSACTION: i32 = -32004;
    pub const FIRM_HASH_MISMATCH: i32 = -32005;
    pub const SOFT_HASH_MISMATCH: i32 = -32006;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Block not found at height {0}")]
    NotFound(u32),

    #[error("Invalid block identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Parent hash mismatch: expected {expected}, got {got}")]
    ParentMismatch { expected: BlockHash, got: BlockHash },

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Firm block hash mismatch at height {height}: expected {expected}, got {got}")]
    FirmHashMismatch {
        height: u32,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("Soft block hash mismatch at height {height}: expected {expected}, got {got}")]
    SoftHashMismatch {
        height: u32,
        expected: BlockHash,
        got: BlockHash,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i32, message: String },
}

impl ExecutionError {
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::InvalidIdentifier(_) => codes::INVALID_IDENTIFIER,
            Self::ParentMismatch { .. } => codes::PARENT_MISMATCH,
            Self::MalformedTransaction(_) => codes::MALFORMED_TRANSACTION,
            Self::FirmHashMismatch { .. } => codes::FIRM_HASH_MISMATCH,
            Self::SoftHashMismatch { .. } => codes::SOFT_HASH_MISMATCH,
            Self::ParseError(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Internal(_) | Self::Transport(_) => codes::INTERNAL_ERROR,
            Self::Rpc { code, .. } => *code,
        }
    }

    /// Rebuilds the typed error from a JSON-RPC error object. Codes this
    /// crate does not know come back as [`ExecutionError::Rpc`].
    pub fn from_rpc_error(err: RpcErrorObject) -> Self {
        #[derive(Deserialize)]
        struct HashMismatch {
            height: u32,
            expected: BlockHash,
            got: BlockHash,
        }

        #[derive(Deserialize)]
        struct ParentMismatch {
            expected: BlockHash,
            got: BlockHash,
        }

        let data = err.data.clone().unwrap_or_default();
        let details = || {
            data.get("details")
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| err.message.clone())
        };

        let typed = match err.code {
            codes::NOT_FOUND => data
                .get("height")
                .and_then(|h| h.as_u64())
                .and_then(|h| u32::try_from(h).ok())
                .map(Self::NotFound),
            codes::INVALID_IDENTIFIER => Some(Self::InvalidIdentifier(details())),
            codes::MALFORMED_TRANSACTION => Some(Self::MalformedTransaction(details())),
            codes::PARENT_MISMATCH => serde_json::from_value::<ParentMismatch>(data.clone())
                .ok()
                .map(|m| Self::ParentMismatch {
                    expected: m.expected,
                    got: m.got,
                }),
            codes::FIRM_HASH_MISMATCH => serde_json::from_value::<HashMismatch>(data.clone())
                .ok()
                .map(|m| Self::FirmHashMismatch {
                    height: m.height,
                    expected: m.expected,
                    got: m.got,
                }),
            codes::SOFT_HASH_MISMATCH => serde_json::from_value::<HashMismatch>(data.clone())
                .ok()
                .map(|m| Self::SoftHashMismatch {
                    height: m.height,
                    expected: m.expected,
                    got: m.got,
                }),
            codes::PARSE_ERROR => Some(Self::ParseError(details())),
            codes::INVALID_REQUEST => Some(Self::InvalidRequest(details())),
            codes::METHOD_NOT_FOUND => Some(Self::MethodNotFound(
                data.get("method")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| err.message.clone()),
            )),
            codes::INVALID_PARAMS => Some(Self::InvalidParams(details())),
            codes::INTERNAL_ERROR => Some(Self::Internal(details())),
            _ => None,
        };

        typed.unwrap_or(Self::Rpc {
            code: err.code,
            message: err.message,
        })
    }
}

impl From<ExecutionError> for RpcErrorObject {
    fn from(err: ExecutionError) -> Self {
        let obj = RpcErrorObject::new(err.code(), err.to_string());
        match err {
            ExecutionError::NotFound(height) => obj.with_data(json!({ "height": height })),
            ExecutionError::ParentMismatch { expected, got } => {
                obj.with_data(json!({ "expected": expected, "got": got }))
            }
            ExecutionError::FirmHashMismatch {
                height,
                expected,
                got,
            }
            | ExecutionError::SoftHashMismatch {
                height,
                expected,
                got,
            } => obj.with_data(json!({ "height": height, "expected": expected, "got": got })),
            ExecutionError::MethodNotFound(method) => obj.with_data(json!({ "method": method })),
            ExecutionError::InvalidIdentifier(msg)
            | ExecutionError::MalformedTransaction(msg)
            | ExecutionError::ParseError(msg)
            | ExecutionError::InvalidRequest(msg)
            | ExecutionError::InvalidParams(msg)
            | ExecutionError::Internal(msg)
            | ExecutionError::Transport(msg) => obj.with_data(json!({ "details": msg })),
            ExecutionError::Rpc { .. } => obj,
        }
    }
}

impl From<oracle_rollup_chain::Error> for ExecutionError {
    fn from(err: oracle_rollup_chain::Error) -> Self {
        use oracle_rollup_chain::Error;
        match err {
            Error::NotFound(height) => Self::NotFound(height),
            Error::MalformedTransaction(msg) => Self::MalformedTransaction(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ExecutionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for ExecutionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
