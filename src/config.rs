use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Address family preference for the listening socket.
///
/// `Dual` binds the IPv6 wildcard with `IPV6_V6ONLY` disabled so IPv4
/// peers arrive as v4-mapped addresses, falling back to an IPv4-only
/// socket if no IPv6 candidate can be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyPref {
    Dual,
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on. Port 0 picks an ephemeral port.
    pub port: u16,
    pub family: FamilyPref,
    /// Number of long-lived connection workers.
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Document root served under `/static/`.
    pub static_dir: PathBuf,
    /// Directories (relative to `static_dir`) whose files are indexed
    /// at startup for query processing.
    pub index_sources: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            family: FamilyPref::Dual,
            pool_size: 100,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./static"),
            index_sources: vec![PathBuf::from(".")],
        }
    }
}

impl Config {
    /// Loads the configuration from the file named by `BEACON_CONFIG`
    /// (default `beacon.yaml`). A missing file yields the defaults; a
    /// present but unreadable or invalid file is a startup error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("BEACON_CONFIG").unwrap_or_else(|_| "beacon.yaml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}
