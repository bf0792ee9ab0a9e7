//! [`SequencerNetwork`] over the CometBFT JSON-RPC interface.

use crate::envelope::SignedTransaction;
use crate::network::{BroadcastTxResult, SequencerNetwork};
use crate::signer::Address;
use crate::TransportError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

#[derive(Deserialize)]
struct AbciQueryResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct NonceValue {
    nonce: u32,
}

pub struct CometHttpNetwork {
    client: Client,
    url: String,
    request_id: AtomicI64,
}

impl CometHttpNetwork {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            request_id: AtomicI64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, TransportError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        log::debug!("sequencer rpc {} (id {})", method, id);
        let envelope: RpcEnvelope = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = envelope.error {
            let message = match err.data {
                Some(Value::String(data)) if !data.is_empty() => format!("{}: {}", err.message, data),
                _ => err.message,
            };
            return Err(TransportError::Rpc {
                code: err.code,
                message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| TransportError::InvalidResponse(format!("{method}: missing result")))?;
        serde_json::from_value(result)
            .map_err(|e| TransportError::InvalidResponse(format!("{method}: {e}")))
    }
}

#[async_trait]
impl SequencerNetwork for CometHttpNetwork {
    async fn broadcast_tx_sync(
        &self,
        tx: &SignedTransaction,
    ) -> Result<BroadcastTxResult, TransportError> {
        let bytes = tx
            .to_bytes()
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.call("broadcast_tx_sync", json!({ "tx": STANDARD.encode(bytes) }))
            .await
    }

    async fn get_nonce(&self, address: &Address) -> Result<u32, TransportError> {
        let query: AbciQueryResult = self
            .call(
                "abci_query",
                json!({ "path": format!("accounts/nonce/{}", address.to_hex()), "data": "" }),
            )
            .await?;

        let response = query.response;
        if response.code != 0 {
            return Err(TransportError::Rpc {
                code: i64::from(response.code),
                message: response.log,
            });
        }
        let value = response
            .value
            .ok_or_else(|| TransportError::InvalidResponse("abci_query: empty value".into()))?;
        let raw = STANDARD
            .decode(value)
            .map_err(|e| TransportError::InvalidResponse(format!("abci_query: {e}")))?;
        let nonce: NonceValue = serde_json::from_slice(&raw)
            .map_err(|e| TransportError::InvalidResponse(format!("abci_query: {e}")))?;
        Ok(nonce.nonce)
    }
}
