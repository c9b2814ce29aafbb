//! # Tidepool Centralized Configuration
//!
//! This crate provides configuration loading and fixed constants for the
//! Tidepool liquidity provisioning services.
//!
//! ## Features
//!
//! - **Provisioning Configuration**: Registry, wallet and reference-asset
//!   addresses plus the pool-call deadline offset
//! - **Defaults**: Reference-asset sentinel, minimum-output floors, deposit
//!   adjustment and file/environment locations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tidepool_config::{defaults, ProvisionConfig};
//!
//! let config = ProvisionConfig::load(None, Some("staging")).expect("valid config");
//! assert_eq!(config.reference_asset, defaults::ETH_SENTINEL);
//! ```

pub mod defaults;
pub mod provision_config;

// Re-export commonly used types
pub use provision_config::{load_config, ProvisionConfig};
