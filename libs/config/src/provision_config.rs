//! Provisioning Configuration Module
//!
//! Loads the addresses and timing parameters the liquidity provisioner is
//! constructed with. Supports a base TOML file, an optional per-environment
//! overlay and `TIDEPOOL_*` environment variable overrides.

use crate::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_DEADLINE_OFFSET_SECS, DEFAULT_LOG_LEVEL, ENV_PREFIX, ETH_SENTINEL,
};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Addresses and parameters injected into the provisioner at construction
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvisionConfig {
    /// Pool registry mapping tokens to their pool address.
    ///
    /// The provisioner itself takes a `PoolRegistry` handle; this is the
    /// contract address a chain-backed registry is built from.
    pub registry: Address,

    /// Custody wallet whose funds are deposited and withdrawn
    pub wallet: Address,

    /// Address standing for the reference asset in requests
    #[serde(default = "default_reference_asset")]
    pub reference_asset: Address,

    /// Seconds between "now" and the deadline passed to pool calls
    #[serde(default = "default_deadline_offset_secs")]
    pub deadline_offset_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_reference_asset() -> Address {
    ETH_SENTINEL
}

fn default_deadline_offset_secs() -> u64 {
    DEFAULT_DEADLINE_OFFSET_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl ProvisionConfig {
    /// Configuration for the given registry and wallet, everything else default
    pub fn new(registry: Address, wallet: Address) -> Self {
        Self {
            registry,
            wallet,
            reference_asset: default_reference_asset(),
            deadline_offset_secs: default_deadline_offset_secs(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Overlays live next to the base file
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the provisioner cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.registry.is_zero() {
            bail!("registry address must be set");
        }
        if self.wallet.is_zero() {
            bail!("wallet address must be set");
        }
        if self.reference_asset.is_zero() {
            bail!("reference asset address must be set");
        }
        if self.deadline_offset_secs == 0 {
            bail!("deadline_offset_secs must be positive");
        }
        Ok(())
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<ProvisionConfig> {
    ProvisionConfig::load(None, environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BASE: &str = r#"
registry = "0x1111111111111111111111111111111111111111"
wallet = "0x2222222222222222222222222222222222222222"
"#;

    #[test]
    fn test_load_base_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("provision.toml");
        fs::write(&config_path, BASE).unwrap();

        let config = ProvisionConfig::load(Some(config_path.as_path()), None).unwrap();

        assert_eq!(config.registry, Address::repeat_byte(0x11));
        assert_eq!(config.wallet, Address::repeat_byte(0x22));
        assert_eq!(config.reference_asset, ETH_SENTINEL);
        assert_eq!(config.deadline_offset_secs, DEFAULT_DEADLINE_OFFSET_SECS);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_environment_overlay() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("provision.toml");
        fs::write(&config_path, BASE).unwrap();

        fs::create_dir(dir.path().join("environments")).unwrap();
        fs::write(
            dir.path().join("environments").join("staging.toml"),
            "deadline_offset_secs = 300\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = ProvisionConfig::load(Some(config_path.as_path()), Some("staging")).unwrap();

        assert_eq!(config.deadline_offset_secs, 300);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.registry, Address::repeat_byte(0x11));
    }

    #[test]
    fn test_missing_overlay_falls_back_to_base() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("provision.toml");
        fs::write(&config_path, BASE).unwrap();

        let config = ProvisionConfig::load(Some(config_path.as_path()), Some("nowhere")).unwrap();
        assert_eq!(config.deadline_offset_secs, DEFAULT_DEADLINE_OFFSET_SECS);
    }

    #[test]
    fn test_zero_registry_rejected() {
        let config = ProvisionConfig::new(Address::zero(), Address::repeat_byte(0x22));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let mut config = ProvisionConfig::new(Address::repeat_byte(0x11), Address::repeat_byte(0x22));
        assert!(config.validate().is_ok());
        config.deadline_offset_secs = 0;
        assert!(config.validate().is_err());
    }
}
