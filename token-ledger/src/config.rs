//! Configuration for the token ledger

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// Contract owner address; barred from holding tokens
    pub owner: Address,

    /// Minimum indivisible unit for balance changes (>= 1)
    pub granularity: u128,

    /// Operators granted automatically at issuance for all holders
    pub default_operators: Vec<Address>,

    /// Gate funding by the recipient's membership status
    ///
    /// Off by default: funding is a mint, gated by emergency, granularity,
    /// and the funding capability only.
    pub fund_requires_membership: bool,

    /// RocksDB configuration
    pub rocksdb: RocksDBConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/token-ledger"),
            service_name: "token-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
            owner: Address::new("owner"),
            granularity: 1,
            default_operators: Vec::new(),
            fund_requires_membership: false,
            rocksdb: RocksDBConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDBConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 4,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults with environment overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("TOKEN_LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(owner) = std::env::var("TOKEN_LEDGER_OWNER") {
            config.owner = Address::new(owner);
        }

        if let Ok(addr) = std::env::var("TOKEN_LEDGER_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot be issued from
    pub fn validate(&self) -> crate::Result<()> {
        if self.owner.is_zero() {
            return Err(crate::Error::Config(
                "Owner address must not be the zero address".to_string(),
            ));
        }
        if self.granularity == 0 {
            return Err(crate::Error::Config(
                "Granularity must be at least 1".to_string(),
            ));
        }
        for op in &self.default_operators {
            if op.is_zero() {
                return Err(crate::Error::Config(
                    "Default operators must not include the zero address".to_string(),
                ));
            }
        }
        Ok(())
    }
}
