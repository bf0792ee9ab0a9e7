//! Beacon-chain head poller feeding the rollup.

use anyhow::{Context, Result};
use oracle_rollup_chain::FinalizedBlockData;
use serde::{de, Deserialize, Deserializer};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::constants::{BEACON_HEAD_PATH, ORACLE_REQUEST_TIMEOUT_SECS};

#[derive(Debug, Deserialize)]
struct BeaconBlockResponse {
    data: BeaconBlockData,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockData {
    message: BeaconBlockMessage,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockMessage {
    #[serde(deserialize_with = "quoted_u64")]
    slot: u64,
    #[serde(deserialize_with = "quoted_u64")]
    proposer_index: u64,
    parent_root: String,
    state_root: String,
    body: BeaconBlockBody,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockBody {
    eth1_data: Eth1Data,
}

#[derive(Debug, Deserialize)]
struct Eth1Data {
    block_hash: String,
}

/// Beacon APIs send integers as decimal strings.
fn quoted_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quoted {
        Str(String),
        Num(u64),
    }

    match Quoted::deserialize(deserializer)? {
        Quoted::Str(s) => s.parse().map_err(de::Error::custom),
        Quoted::Num(n) => Ok(n),
    }
}

/// Extracts the fields the rollup records from a
/// `GET /eth/v2/beacon/blocks/head` response body.
pub fn parse_head_block(body: &[u8]) -> Result<FinalizedBlockData> {
    let response: BeaconBlockResponse =
        serde_json::from_slice(body).context("Failed to decode beacon block response")?;
    let message = response.data.message;
    Ok(FinalizedBlockData {
        // eth1 block hash is recorded as bare hex
        block_hash: message
            .body
            .eth1_data
            .block_hash
            .trim_start_matches("0x")
            .to_string(),
        state_root: message.state_root,
        parent_root: message.parent_root,
        slot: message.slot,
        proposer_index: message.proposer_index,
    })
}

pub struct BeaconClient {
    client: reqwest::Client,
    base_url: String,
}

impl BeaconClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(ORACLE_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_head(&self) -> Result<FinalizedBlockData> {
        let url = format!("{}{}", self.base_url, BEACON_HEAD_PATH);
        let body = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach beacon node at {url}"))?
            .error_for_status()?
            .bytes()
            .await?;
        parse_head_block(&body)
    }
}

/// Polls the beacon head every `interval` and pushes each observation into
/// `sink`. A failed poll is logged and skipped. Returns when `cancel` fires
/// or the receiving side is gone.
pub async fn run_poller(
    beacon: BeaconClient,
    interval: Duration,
    sink: mpsc::Sender<FinalizedBlockData>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        log::debug!("polling beacon head from {}", beacon.base_url);
        let data = match beacon.fetch_head().await {
            Ok(data) => data,
            Err(e) => {
                log::error!("beacon poll failed: {:#}", e);
                continue;
            }
        };
        log::info!(
            "observed beacon slot {} (proposer {})",
            data.slot,
            data.proposer_index
        );

        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = sink.send(data) => {
                if sent.is_err() {
                    log::warn!("feed receiver dropped, stopping beacon poller");
                    break;
                }
            }
        }
    }
    log::info!("beacon poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn head_response(slot: u64) -> serde_json::Value {
        json!({
            "version": "deneb",
            "execution_optimistic": false,
            "finalized": false,
            "data": {
                "message": {
                    "slot": slot.to_string(),
                    "proposer_index": "1337",
                    "parent_root": "0x1111111111111111111111111111111111111111111111111111111111111111",
                    "state_root": "0x2222222222222222222222222222222222222222222222222222222222222222",
                    "body": {
                        "randao_reveal": "0x00",
                        "eth1_data": {
                            "deposit_root": "0x00",
                            "deposit_count": "1",
                            "block_hash": "0x3333333333333333333333333333333333333333333333333333333333333333"
                        }
                    }
                },
                "signature": "0x00"
            }
        })
    }

    #[test]
    fn test_parse_head_block() -> Result<()> {
        let body = serde_json::to_vec(&head_response(8_000_123))?;
        let data = parse_head_block(&body)?;
        assert_eq!(data.slot, 8_000_123);
        assert_eq!(data.proposer_index, 1337);
        assert_eq!(data.parent_root, format!("0x{}", "11".repeat(32)));
        assert_eq!(data.state_root, format!("0x{}", "22".repeat(32)));
        assert_eq!(data.block_hash, "33".repeat(32));
        Ok(())
    }

    #[test]
    fn test_numeric_slot_accepted() -> Result<()> {
        let mut value = head_response(5);
        value["data"]["message"]["slot"] = json!(5);
        let data = parse_head_block(&serde_json::to_vec(&value)?)?;
        assert_eq!(data.slot, 5);
        Ok(())
    }

    #[test]
    fn test_rejects_incomplete_body() {
        assert!(parse_head_block(br#"{"data":{"message":{"slot":"1"}}}"#).is_err());
        assert!(parse_head_block(b"<html>").is_err());

        let mut value = head_response(1);
        value["data"]["message"]["slot"] = json!("twelve");
        assert!(parse_head_block(&serde_json::to_vec(&value).unwrap()).is_err());
    }
}
