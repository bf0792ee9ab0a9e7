use crate::envelope::{SignedTransaction, UnsignedTransaction};
use crate::network::{BroadcastTxResult, SequencerNetwork};
use crate::signer::Signer;
use crate::{Result, SequencerError};
use oracle_rollup_chain::{RollupId, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const SUCCESS_CODE: u32 = 0;
/// Returned by the sequencer when the envelope nonce is not the account's
/// current nonce.
pub const NONCE_CONFLICT_CODE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total broadcasts allowed for one submission, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): doubles each time, capped.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Signs rollup transactions and delivers them to the sequencer network.
///
/// Submissions are serialized on the nonce cache: the lock is held from the
/// first broadcast until the submission resolves, so a refresh-and-retry
/// never interleaves with another submitter.
pub struct SequencerClient {
    network: Arc<dyn SequencerNetwork>,
    signer: Signer,
    rollup_id: RollupId,
    nonce: Mutex<u32>,
    retry_policy: RetryPolicy,
}

impl SequencerClient {
    pub fn new(network: Arc<dyn SequencerNetwork>, signer: Signer, rollup_id: RollupId) -> Self {
        Self {
            network,
            signer,
            rollup_id,
            nonce: Mutex::new(0),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn rollup_id(&self) -> RollupId {
        self.rollup_id
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Current value of the nonce cache. Advisory only.
    pub async fn nonce(&self) -> u32 {
        *self.nonce.lock().await
    }

    pub async fn submit_transaction(&self, tx: &Transaction) -> Result<BroadcastTxResult> {
        let data = tx.encode()?;
        let address = self.signer.address();
        let max_attempts = self.retry_policy.max_attempts.max(1);

        let mut nonce = self.nonce.lock().await;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let unsigned = UnsignedTransaction::sequence(*nonce, self.rollup_id, data.clone());
            let signed = SignedTransaction::sign(unsigned, &self.signer)?;

            log::debug!(
                "broadcasting rollup tx (nonce {}, attempt {}/{})",
                *nonce,
                attempt,
                max_attempts
            );
            let result = self.network.broadcast_tx_sync(&signed).await?;

            match result.code {
                SUCCESS_CODE => {
                    log::info!("submitted rollup tx {} with nonce {}", result.hash, *nonce);
                    return Ok(result);
                }
                NONCE_CONFLICT_CODE => {
                    let fresh = self.network.get_nonce(&address).await?;
                    log::warn!(
                        "nonce conflict for {} (cached {}, sequencer {}): {}",
                        address,
                        *nonce,
                        fresh,
                        result.log
                    );
                    *nonce = fresh;

                    if attempt >= max_attempts {
                        return Err(SequencerError::RetryExhausted { attempts: attempt });
                    }
                    tokio::time::sleep(self.retry_policy.backoff_for(attempt - 1)).await;
                }
                code => {
                    return Err(SequencerError::SubmissionRejected {
                        code,
                        log: result.log,
                    });
                }
            }
        }
    }
}
