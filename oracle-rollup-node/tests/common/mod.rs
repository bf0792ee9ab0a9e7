#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, routing::get, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use oracle_rollup_sequencer::{
    Address, BroadcastTxResult, SequencerNetwork, SignedTransaction, TransportError,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const SEED: &str = "00fd4d6af5ac34d29d63a04ecf7da1ccfcbcdf7f7ed4042b8975e1c54e96d685";

pub fn head_response(slot: u64) -> Value {
    json!({
        "version": "deneb",
        "data": {
            "message": {
                "slot": slot.to_string(),
                "proposer_index": "77",
                "parent_root": format!("0x{}", "aa".repeat(32)),
                "state_root": format!("0x{}", "bb".repeat(32)),
                "body": { "eth1_data": { "block_hash": format!("0x{}", "cc".repeat(32)) } }
            }
        }
    })
}

pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Beacon node stub serving a fixed head slot.
pub async fn spawn_beacon(slot: u64) -> SocketAddr {
    let router = Router::new().route(
        "/eth/v2/beacon/blocks/head",
        get(move || async move { Json(head_response(slot)) }),
    );
    spawn_router(router).await
}

/// CometBFT stub accepting every broadcast and recording the envelopes.
pub async fn spawn_comet() -> (SocketAddr, Arc<Mutex<Vec<SignedTransaction>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/", post(comet_rpc))
        .with_state(received.clone());
    (spawn_router(router).await, received)
}

async fn comet_rpc(
    State(received): State<Arc<Mutex<Vec<SignedTransaction>>>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let id = request["id"].clone();
    match request["method"].as_str() {
        Some("broadcast_tx_sync") => {
            let raw = STANDARD
                .decode(request["params"]["tx"].as_str().unwrap_or_default())
                .unwrap();
            let tx: SignedTransaction = serde_json::from_slice(&raw).unwrap();
            received.lock().unwrap().push(tx);
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": { "code": 0, "data": "", "log": "", "codespace": "", "hash": "C0FFEE" }
            }))
        }
        Some("abci_query") => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": { "response": { "code": 0, "value": STANDARD.encode(br#"{"nonce":0}"#) } }
        })),
        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": "Method not found" }
        })),
    }
}

/// In-process sequencer network replaying scripted result codes.
#[derive(Default)]
pub struct ScriptedNetwork {
    pub codes: Mutex<VecDeque<u32>>,
    pub received: Mutex<Vec<SignedTransaction>>,
}

impl ScriptedNetwork {
    pub fn new(codes: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            codes: Mutex::new(codes.iter().copied().collect()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl SequencerNetwork for ScriptedNetwork {
    async fn broadcast_tx_sync(
        &self,
        tx: &SignedTransaction,
    ) -> Result<BroadcastTxResult, TransportError> {
        self.received.lock().unwrap().push(tx.clone());
        let code = self.codes.lock().unwrap().pop_front().unwrap_or(0);
        Ok(BroadcastTxResult {
            code,
            hash: format!("H{}", tx.nonce()),
            log: String::new(),
        })
    }

    async fn get_nonce(&self, _address: &Address) -> Result<u32, TransportError> {
        Ok(0)
    }
}
