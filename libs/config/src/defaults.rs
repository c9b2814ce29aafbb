//! Provisioning defaults and fixed protocol constants
//!
//! Values here are process-wide and immutable. Anything an operator may need
//! to change per deployment lives in [`crate::ProvisionConfig`] instead.

use ethers_core::types::{Address, H160};

/// Sentinel address standing for the chain's native coin, the reference
/// asset on one side of every pool
pub const ETH_SENTINEL: Address = H160([0xee; 20]);

/// Seconds added to the current time to form the deadline of pool calls
pub const DEFAULT_DEADLINE_OFFSET_SECS: u64 = 1;

/// Default tracing filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Minimum output accepted from swaps and withdrawals.
///
/// A floor of one unit accepts any non-zero output; it is not slippage
/// protection.
pub const MIN_OUTPUT_FLOOR: u64 = 1;

/// Minimum pool shares accepted from a deposit
pub const MIN_SHARE_FLOOR: u64 = 1;

/// Units withheld from the reference-asset deposit to absorb the pool's
/// rounded-up token requirement.
///
/// This narrows the rounding gap but does not close it: after a large
/// rebalancing swap the pool can still ask one token more than the computed
/// deposit, and the deposit call reverts.
pub const REFERENCE_DEPOSIT_ADJUSTMENT: u64 = 1;

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/provision.toml";

/// Prefix of environment variables overriding file configuration
pub const ENV_PREFIX: &str = "TIDEPOOL";
