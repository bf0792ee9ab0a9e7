use oracle_rollup_chain::{FinalizedBlockData, Transaction};
use oracle_rollup_sequencer::SequencerClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub submitted: u64,
    pub failed: u64,
}

/// Wraps each beacon observation in a rollup transaction and submits it.
///
/// A failed submission is logged and the observation dropped. Cancellation
/// is only observed between items, so an in-flight submission always runs
/// to completion.
pub async fn drain_feed(
    mut source: mpsc::Receiver<FinalizedBlockData>,
    client: Arc<SequencerClient>,
    cancel: CancellationToken,
) -> FeedStats {
    let mut stats = FeedStats::default();

    loop {
        let data = tokio::select! {
            _ = cancel.cancelled() => break,
            item = source.recv() => match item {
                Some(data) => data,
                None => break,
            },
        };

        let slot = data.slot;
        let tx = Transaction::from(data);
        match client.submit_transaction(&tx).await {
            Ok(result) => {
                stats.submitted += 1;
                log::debug!("slot {} sequenced as {} (code {})", slot, result.hash, result.code);
            }
            Err(e) => {
                stats.failed += 1;
                log::error!("dropping slot {}: {}", slot, e);
            }
        }
    }

    log::info!(
        "feed drainer stopped ({} submitted, {} failed)",
        stats.submitted,
        stats.failed
    );
    stats
}
