use anyhow::{Context, Result};
use clap::Parser;
use oracle_rollup_node::logging::init_logging;
use oracle_rollup_node::{Config, Node, NodeConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
pub struct Opts {
    /// JSON config file; its values apply where no flag or env var is set
    #[clap(long)]
    config: Option<PathBuf>,

    /// Beacon node base URL
    #[clap(long, env = "ETHEREUM_RPC")]
    ethereum_rpc: Option<String>,

    /// Shared sequencer CometBFT RPC URL
    #[clap(long, env = "SEQUENCER_RPC")]
    sequencer_rpc: Option<String>,

    /// Listen address for the execution RPC the conductor connects to
    #[clap(long, env = "CONDUCTOR_RPC")]
    conductor_rpc: Option<String>,

    #[clap(long, env = "ROLLUP_NAME")]
    rollup_name: Option<String>,

    /// Hex ed25519 seed used to sign sequencer transactions
    #[clap(long, env = "SEQUENCER_PRIVATE", hide_env_values = true)]
    sequencer_private: Option<String>,

    /// Listen address for the block query API
    #[clap(long, env = "RESTAPI_PORT")]
    restapi_port: Option<String>,

    #[clap(long, env = "POLL_INTERVAL_SECS")]
    poll_interval_secs: Option<u64>,

    #[clap(long)]
    log_level: Option<String>,
}

impl Opts {
    fn as_config(&self) -> Config {
        Config {
            ethereum_rpc: self.ethereum_rpc.clone(),
            sequencer_rpc: self.sequencer_rpc.clone(),
            conductor_rpc: self.conductor_rpc.clone(),
            rollup_name: self.rollup_name.clone(),
            sequencer_private: self.sequencer_private.clone(),
            restapi_port: self.restapi_port.clone(),
            log_level: self.log_level.clone(),
            poll_interval_secs: self.poll_interval_secs,
            ..Default::default()
        }
    }
}

pub async fn run(opts: &Opts) -> Result<()> {
    let file_config = match &opts.config {
        Some(path) => Config::from_filepath(path)?,
        None => Config::default(),
    };
    let config = opts.as_config().or(file_config);

    init_logging(config.log_level.as_deref())?;
    if let Some(path) = &opts.config {
        log::info!("Config file: {}", path.display());
    }

    let config = NodeConfig::resolve(config).context("Invalid node configuration")?;

    let cancel = CancellationToken::new();
    let node = Node::start(config, cancel.clone()).await?;
    log::info!(
        "execution RPC on {}, query API on {}",
        node.conductor_addr,
        node.restapi_addr
    );

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("received Ctrl-C"),
            Err(e) => log::error!("failed to listen for Ctrl-C: {}", e),
        }
        cancel.cancel();
    });

    let stats = node.wait().await?;
    log::info!(
        "submitted {} observations ({} failed)",
        stats.submitted,
        stats.failed
    );
    Ok(())
}
