use async_trait::async_trait;
use oracle_rollup_chain::{FinalizedBlockData, RollupId, Transaction};
use oracle_rollup_sequencer::{
    Address, BroadcastTxResult, RetryPolicy, SequencerClient, SequencerError, SequencerNetwork,
    SignedTransaction, Signer, TransportError, NONCE_CONFLICT_CODE,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays scripted broadcast codes and nonce values, recording every
/// envelope it receives.
#[derive(Default)]
struct MockNetwork {
    codes: Mutex<VecDeque<u32>>,
    nonces: Mutex<VecDeque<u32>>,
    broadcasts: Mutex<Vec<SignedTransaction>>,
    nonce_fetches: Mutex<u32>,
    fail_broadcast: bool,
}

impl MockNetwork {
    fn scripted(codes: &[u32], nonces: &[u32]) -> Arc<Self> {
        Arc::new(Self {
            codes: Mutex::new(codes.iter().copied().collect()),
            nonces: Mutex::new(nonces.iter().copied().collect()),
            ..Default::default()
        })
    }

    fn broadcasts(&self) -> Vec<SignedTransaction> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn nonce_fetches(&self) -> u32 {
        *self.nonce_fetches.lock().unwrap()
    }
}

#[async_trait]
impl SequencerNetwork for MockNetwork {
    async fn broadcast_tx_sync(
        &self,
        tx: &SignedTransaction,
    ) -> Result<BroadcastTxResult, TransportError> {
        if self.fail_broadcast {
            return Err(TransportError::InvalidResponse("connection reset".into()));
        }
        self.broadcasts.lock().unwrap().push(tx.clone());
        let code = self.codes.lock().unwrap().pop_front().unwrap_or(0);
        Ok(BroadcastTxResult {
            code,
            hash: format!("TX{}", tx.nonce()),
            log: if code == 0 { String::new() } else { format!("code {code}") },
        })
    }

    async fn get_nonce(&self, _address: &Address) -> Result<u32, TransportError> {
        *self.nonce_fetches.lock().unwrap() += 1;
        self.nonces
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::InvalidResponse("no nonce scripted".into()))
    }
}

fn transaction(slot: u64) -> Transaction {
    Transaction::new(FinalizedBlockData {
        block_hash: "0xaa".into(),
        state_root: "0xbb".into(),
        parent_root: "0xcc".into(),
        slot,
        proposer_index: 3,
    })
}

fn client(network: Arc<MockNetwork>) -> SequencerClient {
    let signer = Signer::from_seed(&[1u8; 32]).unwrap();
    SequencerClient::new(network, signer, RollupId::from_name("blockchain-oracle-rollup"))
}

#[tokio::test(start_paused = true)]
async fn test_conflict_twice_then_success() {
    let network = MockNetwork::scripted(&[NONCE_CONFLICT_CODE, NONCE_CONFLICT_CODE, 0], &[5, 6]);
    let client = client(network.clone());

    let result = client.submit_transaction(&transaction(1)).await.unwrap();
    assert_eq!(result.code, 0);

    let sent = network.broadcasts();
    assert_eq!(sent.len(), 3);
    assert_eq!(network.nonce_fetches(), 2);
    assert_eq!(client.nonce().await, 6);

    let nonces: Vec<u32> = sent.iter().map(|tx| tx.nonce()).collect();
    assert_eq!(nonces, vec![0, 5, 6]);
    assert!(sent.iter().all(|tx| tx.verify()));
}

#[tokio::test(start_paused = true)]
async fn test_success_leaves_nonce_unchanged() {
    let network = MockNetwork::scripted(&[0, 0], &[]);
    let client = client(network.clone());

    client.submit_transaction(&transaction(1)).await.unwrap();
    client.submit_transaction(&transaction(2)).await.unwrap();

    assert_eq!(client.nonce().await, 0);
    assert_eq!(network.nonce_fetches(), 0);
    assert_eq!(network.broadcasts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_envelope_carries_rollup_payload() {
    let network = MockNetwork::scripted(&[0], &[]);
    let client = client(network.clone());
    let tx = transaction(77);

    client.submit_transaction(&tx).await.unwrap();

    let sent = network.broadcasts();
    let oracle_rollup_sequencer::Action::Sequence { rollup_id, data } =
        &sent[0].transaction.actions[0];
    assert_eq!(*rollup_id, client.rollup_id());
    assert_eq!(Transaction::decode(data).unwrap(), tx);
    assert_eq!(sent[0].public_key, client.signer().public_key().to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_other_code_is_rejected_without_retry() {
    let network = MockNetwork::scripted(&[7], &[]);
    let client = client(network.clone());

    let err = client.submit_transaction(&transaction(1)).await.unwrap_err();
    assert!(matches!(err, SequencerError::SubmissionRejected { code: 7, .. }));
    assert_eq!(network.broadcasts().len(), 1);
    assert_eq!(network.nonce_fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_broadcast_transport_error_is_not_retried() {
    let network = Arc::new(MockNetwork {
        fail_broadcast: true,
        ..Default::default()
    });
    let client = client(network.clone());

    let err = client.submit_transaction(&transaction(1)).await.unwrap_err();
    assert!(matches!(err, SequencerError::Transport(_)));
    assert_eq!(network.nonce_fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_nonce_fetch_error_is_not_retried() {
    let network = MockNetwork::scripted(&[NONCE_CONFLICT_CODE, 0], &[]);
    let client = client(network.clone());

    let err = client.submit_transaction(&transaction(1)).await.unwrap_err();
    assert!(matches!(err, SequencerError::Transport(_)));
    assert_eq!(network.broadcasts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhausted() {
    let network = MockNetwork::scripted(&[NONCE_CONFLICT_CODE; 3], &[1, 2, 3]);
    let client = client(network.clone()).with_retry_policy(RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(20),
    });

    let err = client.submit_transaction(&transaction(1)).await.unwrap_err();
    assert!(matches!(err, SequencerError::RetryExhausted { attempts: 3 }));
    assert_eq!(network.broadcasts().len(), 3);
    assert_eq!(client.nonce().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_submissions_are_serialized() {
    let network = MockNetwork::scripted(&[NONCE_CONFLICT_CODE, 0, 0], &[4]);
    let client = Arc::new(client(network.clone()));

    let a = tokio::spawn({
        let client = client.clone();
        async move { client.submit_transaction(&transaction(1)).await }
    });
    let b = tokio::spawn({
        let client = client.clone();
        async move { client.submit_transaction(&transaction(2)).await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let nonces: Vec<u32> = network.broadcasts().iter().map(|tx| tx.nonce()).collect();
    assert_eq!(nonces, vec![0, 4, 4]);
}
