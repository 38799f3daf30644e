use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Node configuration, loadable from a TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Capacity of per-watcher broadcast channels.
    pub channel_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9933".parse().unwrap(),
            channel_capacity: cpl_ledger::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl NodeConfig {
    /// Load a configuration file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let body = std::fs::read_to_string(path)?;
        toml::from_str(&body).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = NodeConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:9933".parse::<SocketAddr>().unwrap());
        assert_eq!(c.channel_capacity, cpl_ledger::DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:8000\"\n").unwrap();

        let c = NodeConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.channel_capacity, cpl_ledger::DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "bind_addr = 12").unwrap();

        assert!(matches!(
            NodeConfig::load(&path),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            NodeConfig::load(&dir.path().join("absent.toml")),
            Err(ServerError::Io(_))
        ));
    }
}
