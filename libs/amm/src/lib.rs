//! # Tidepool AMM Library - Liquidity Provisioning Mathematics
//!
//! ## Purpose
//!
//! Exact integer mathematics for depositing into and withdrawing from
//! constant-product pools where one side is a reference asset. Prices single
//! swaps net of the 0.3% fee, sizes the rebalancing swap that turns an
//! unbalanced pair of amounts into a ratio-matched deposit, and converts
//! basis-point fractions into pool-share amounts.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots read by the provisioning service,
//!   caller-supplied deposit amounts and withdrawal fractions
//! - **Output Destinations**: Deposit orchestrator, offline planning CLI,
//!   simulated pools used in tests
//! - **Precision**: Raw on-chain units in `U256`, floor division, products
//!   formed before quotients, every operation overflow-checked
//!
//! ## Architecture Role
//!
//! ```text
//! Deposit Orchestrator ──► allocation::allocate ──► RebalancePlanner::plan ──► V2Math::quote
//!                                    │
//!                                    └─► V2Math::proportional_amount (no-swap trim)
//! Withdrawal Planner ───► withdrawal::withdrawal_amount
//! ```
//!
//! Nothing here performs I/O or holds state; every function is a pure
//! calculation over the values it is given.

pub mod allocation;
pub mod checked;
pub mod error;
pub mod pool_traits;
pub mod rebalance;
pub mod v2_math;
pub mod withdrawal;

pub use allocation::{allocate, Allocation, Excess};
pub use error::{AmmError, Result};
pub use pool_traits::{AmmPool, PoolReserves, SwapDirection};
pub use rebalance::{RebalancePlanner, SwapPlan, REBALANCE_DIVISOR};
pub use v2_math::{V2Math, FEE_DENOMINATOR, FEE_NUMERATOR};
pub use withdrawal::{withdrawal_amount, BasisPoints, MAX_BPS};

/// Common numeric type for all AMM calculations
pub use ethers_core::types::U256;
