use anyhow::{Context, Result};
use oracle_rollup_chain::ChainStore;
use oracle_rollup_execution::{ExecutionRpcServer, ExecutionService};
use oracle_rollup_sequencer::{CometHttpNetwork, SequencerClient, Signer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::NodeConfig;
use crate::constants::FEED_CHANNEL_CAPACITY;
use crate::feed::{drain_feed, FeedStats};
use crate::oracle::{run_poller, BeaconClient};
use crate::query::{self, QueryState};

/// A running node: the execution RPC server, the query API, the beacon
/// poller and the feed drainer, all tied to one cancellation token.
pub struct Node {
    pub execution: Arc<ExecutionService>,
    pub sequencer: Arc<SequencerClient>,
    pub conductor_addr: SocketAddr,
    pub restapi_addr: SocketAddr,
    cancel: CancellationToken,
    servers: Vec<JoinHandle<std::io::Result<()>>>,
    poller: JoinHandle<()>,
    drainer: JoinHandle<FeedStats>,
}

impl Node {
    /// Binds both listeners and spawns every task. Nothing is spawned unless
    /// every fallible setup step succeeds.
    pub async fn start(config: NodeConfig, cancel: CancellationToken) -> Result<Node> {
        log::info!("starting node with {:?}", config);

        let signer = Signer::from_seed_hex(&config.sequencer_private)
            .context("Invalid sequencer signing key")?;
        log::info!("sequencer address {}", signer.address());
        log::info!("rollup {} ({})", config.rollup_name, config.rollup_id());

        let execution = Arc::new(ExecutionService::new(
            ChainStore::new_shared(),
            config.genesis_info(),
        ));
        let beacon = BeaconClient::new(&config.ethereum_rpc)?;
        let network = Arc::new(CometHttpNetwork::new(config.sequencer_rpc.clone()));
        let sequencer = Arc::new(SequencerClient::new(network, signer, config.rollup_id()));

        let conductor_listener = TcpListener::bind(config.conductor_addr)
            .await
            .with_context(|| format!("Failed to bind execution RPC on {}", config.conductor_addr))?;
        let conductor_addr = conductor_listener.local_addr()?;
        let rest_listener = TcpListener::bind(config.restapi_addr)
            .await
            .with_context(|| format!("Failed to bind query API on {}", config.restapi_addr))?;
        let restapi_addr = rest_listener.local_addr()?;

        let execution_server = {
            let cancel = cancel.clone();
            tokio::spawn(
                ExecutionRpcServer::new(execution.clone())
                    .serve(conductor_listener, async move { cancel.cancelled().await }),
            )
        };

        let query_state =
            QueryState::new(execution.clone(), cancel.clone()).with_sequencer(sequencer.clone());
        let query_server = tokio::spawn(query::serve(rest_listener, query_state));

        let (feed_tx, feed_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let poller = tokio::spawn(run_poller(
            beacon,
            config.poll_interval,
            feed_tx,
            cancel.clone(),
        ));
        let drainer = tokio::spawn(drain_feed(feed_rx, sequencer.clone(), cancel.clone()));

        Ok(Node {
            execution,
            sequencer,
            conductor_addr,
            restapi_addr,
            cancel,
            servers: vec![execution_server, query_server],
            poller,
            drainer,
        })
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for cancellation, then for every task to wind down.
    pub async fn wait(self) -> Result<FeedStats> {
        self.cancel.cancelled().await;
        log::info!("shutting down");

        self.poller.await.context("beacon poller panicked")?;
        let stats = self.drainer.await.context("feed drainer panicked")?;
        for server in self.servers {
            server.await.context("server task panicked")??;
        }
        log::info!("node stopped");
        Ok(stats)
    }
}
