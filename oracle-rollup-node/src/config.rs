use anyhow::{Context, Result};
use oracle_rollup_chain::RollupId;
use oracle_rollup_execution::GenesisInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::constants::*;

/// One layer of node settings. Command-line flags, environment variables and
/// the JSON config file each produce one of these; [`Config::or`] stacks them.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub ethereum_rpc: Option<String>,
    pub sequencer_rpc: Option<String>,
    pub conductor_rpc: Option<String>,
    pub rollup_name: Option<String>,
    pub sequencer_private: Option<String>,
    pub restapi_port: Option<String>,
    pub log_level: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub sequencer_genesis_block_height: Option<u32>,
    pub celestia_base_block_height: Option<u32>,
    pub celestia_block_variance: Option<u32>,
}

impl Config {
    pub fn from_filepath(path: &Path) -> Result<Config> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config: Config = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Fields set in `self` win; unset ones are taken from `fallback`.
    pub fn or(self, fallback: Config) -> Config {
        Config {
            ethereum_rpc: self.ethereum_rpc.or(fallback.ethereum_rpc),
            sequencer_rpc: self.sequencer_rpc.or(fallback.sequencer_rpc),
            conductor_rpc: self.conductor_rpc.or(fallback.conductor_rpc),
            rollup_name: self.rollup_name.or(fallback.rollup_name),
            sequencer_private: self.sequencer_private.or(fallback.sequencer_private),
            restapi_port: self.restapi_port.or(fallback.restapi_port),
            log_level: self.log_level.or(fallback.log_level),
            poll_interval_secs: self.poll_interval_secs.or(fallback.poll_interval_secs),
            sequencer_genesis_block_height: self
                .sequencer_genesis_block_height
                .or(fallback.sequencer_genesis_block_height),
            celestia_base_block_height: self
                .celestia_base_block_height
                .or(fallback.celestia_base_block_height),
            celestia_block_variance: self
                .celestia_block_variance
                .or(fallback.celestia_block_variance),
        }
    }
}

/// Fully resolved settings the node runs with.
#[derive(Clone)]
pub struct NodeConfig {
    pub ethereum_rpc: String,
    pub sequencer_rpc: String,
    pub conductor_addr: SocketAddr,
    pub rollup_name: String,
    pub sequencer_private: String,
    pub restapi_addr: SocketAddr,
    pub poll_interval: Duration,
    pub sequencer_genesis_block_height: u32,
    pub celestia_base_block_height: u32,
    pub celestia_block_variance: u32,
}

impl NodeConfig {
    pub fn resolve(config: Config) -> Result<NodeConfig> {
        let sequencer_private = config
            .sequencer_private
            .filter(|s| !s.trim().is_empty())
            .context("Missing sequencer signing key (--sequencer-private / SEQUENCER_PRIVATE)")?;

        let conductor_rpc = config
            .conductor_rpc
            .unwrap_or_else(|| DEFAULT_CONDUCTOR_RPC.to_string());
        let restapi_port = config
            .restapi_port
            .unwrap_or_else(|| DEFAULT_RESTAPI_ADDR.to_string());

        let poll_interval_secs = config.poll_interval_secs.unwrap_or(ORACLE_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than zero");
        }

        Ok(NodeConfig {
            ethereum_rpc: config
                .ethereum_rpc
                .unwrap_or_else(|| DEFAULT_ETHEREUM_RPC.to_string()),
            sequencer_rpc: config
                .sequencer_rpc
                .unwrap_or_else(|| DEFAULT_SEQUENCER_RPC.to_string()),
            conductor_addr: parse_listen_addr(&conductor_rpc)
                .with_context(|| format!("Invalid conductor address {conductor_rpc:?}"))?,
            rollup_name: config
                .rollup_name
                .unwrap_or_else(|| DEFAULT_ROLLUP_NAME.to_string()),
            sequencer_private,
            restapi_addr: parse_listen_addr(&restapi_port)
                .with_context(|| format!("Invalid REST API address {restapi_port:?}"))?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            sequencer_genesis_block_height: config.sequencer_genesis_block_height.unwrap_or(1),
            celestia_base_block_height: config.celestia_base_block_height.unwrap_or(1),
            celestia_block_variance: config.celestia_block_variance.unwrap_or(1),
        })
    }

    pub fn rollup_id(&self) -> RollupId {
        RollupId::from_name(&self.rollup_name)
    }

    pub fn genesis_info(&self) -> GenesisInfo {
        GenesisInfo {
            rollup_id: self.rollup_id(),
            sequencer_genesis_block_height: self.sequencer_genesis_block_height,
            celestia_base_block_height: self.celestia_base_block_height,
            celestia_block_variance: self.celestia_block_variance,
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("ethereum_rpc", &self.ethereum_rpc)
            .field("sequencer_rpc", &self.sequencer_rpc)
            .field("conductor_addr", &self.conductor_addr)
            .field("rollup_name", &self.rollup_name)
            .field("sequencer_private", &"<redacted>")
            .field("restapi_addr", &self.restapi_addr)
            .field("poll_interval", &self.poll_interval)
            .field(
                "sequencer_genesis_block_height",
                &self.sequencer_genesis_block_height,
            )
            .field("celestia_base_block_height", &self.celestia_base_block_height)
            .field("celestia_block_variance", &self.celestia_block_variance)
            .finish()
    }
}

/// Accepts `host:port`, `:port` (all interfaces) and an optional
/// `http://` scheme.
pub fn parse_listen_addr(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    let value = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .unwrap_or(value)
        .trim_end_matches('/');
    let value = value.replace("localhost", "127.0.0.1");
    let value = if value.starts_with(':') {
        format!("0.0.0.0{value}")
    } else {
        value
    };
    Ok(value.parse::<SocketAddr>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = "00fd4d6af5ac34d29d63a04ecf7da1ccfcbcdf7f7ed4042b8975e1c54e96d685";

    fn with_seed() -> Config {
        Config {
            sequencer_private: Some(SEED.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = NodeConfig::resolve(with_seed())?;
        assert_eq!(config.ethereum_rpc, "http://localhost:8545");
        assert_eq!(config.sequencer_rpc, "http://localhost:26657");
        assert_eq!(config.conductor_addr, "127.0.0.1:50051".parse::<SocketAddr>()?);
        assert_eq!(config.rollup_name, "blockchain-oracle-rollup");
        assert_eq!(config.restapi_addr, "0.0.0.0:8080".parse::<SocketAddr>()?);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.genesis_info(), GenesisInfo::new(config.rollup_id()));
        Ok(())
    }

    #[test]
    fn test_missing_seed_is_an_error() {
        assert!(NodeConfig::resolve(Config::default()).is_err());
        let blank = Config {
            sequencer_private: Some("  ".into()),
            ..Default::default()
        };
        assert!(NodeConfig::resolve(blank).is_err());
    }

    #[test]
    fn test_flags_win_over_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "ethereum_rpc": "http://beacon.internal:5052",
                "rollup_name": "from-file",
                "sequencer_private": "{SEED}",
                "celestia_block_variance": 4
            }}"#
        )?;

        let from_file = Config::from_filepath(file.path())?;
        let flags = Config {
            rollup_name: Some("from-flags".into()),
            ..Default::default()
        };
        let config = NodeConfig::resolve(flags.or(from_file))?;

        assert_eq!(config.ethereum_rpc, "http://beacon.internal:5052");
        assert_eq!(config.rollup_name, "from-flags");
        assert_eq!(config.sequencer_private, SEED);
        assert_eq!(config.celestia_block_variance, 4);
        assert_eq!(config.celestia_base_block_height, 1);
        Ok(())
    }

    #[test]
    fn test_unknown_file_rejected_cleanly() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(Config::from_filepath(&dir.path().join("missing.json")).is_err());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json")?;
        assert!(Config::from_filepath(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_listen_addr_forms() -> Result<()> {
        assert_eq!(parse_listen_addr(":8080")?, "0.0.0.0:8080".parse::<SocketAddr>()?);
        assert_eq!(parse_listen_addr("http://localhost:50051")?, "127.0.0.1:50051".parse::<SocketAddr>()?);
        assert_eq!(parse_listen_addr("10.0.0.2:9000")?, "10.0.0.2:9000".parse::<SocketAddr>()?);
        assert!(parse_listen_addr("nowhere").is_err());
        Ok(())
    }

    #[test]
    fn test_debug_redacts_seed() -> Result<()> {
        let config = NodeConfig::resolve(with_seed())?;
        let printed = format!("{config:?}");
        assert!(!printed.contains(SEED));
        assert!(printed.contains("<redacted>"));
        Ok(())
    }
}
