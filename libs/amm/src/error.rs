//! Error types for constant-product pricing and rebalancing math
//!
//! Every fallible calculation in this crate reports exactly one of these
//! variants; nothing is clamped, wrapped or silently saturated.

use ethers_core::types::U256;
use thiserror::Error;

/// Errors produced by the pricer, rebalance planner and withdrawal math
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// One side of the pool holds nothing, so no price exists
    #[error("Degenerate pool: reserves ({input_reserve}, {output_reserve}) must both be non-zero")]
    DegeneratePool {
        input_reserve: U256,
        output_reserve: U256,
    },

    /// A swap would drain the whole output side of the pool
    #[error("Insufficient liquidity: swap output {requested} would exhaust reserve {reserve}")]
    InsufficientLiquidity { reserve: U256, requested: U256 },

    /// An intermediate product, sum or difference left the 256-bit range
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    /// Withdrawal fraction outside [0, 10000] basis points
    #[error("Invalid fraction: {bps} bps exceeds 10000")]
    InvalidFraction { bps: u32 },
}

pub type Result<T> = std::result::Result<T, AmmError>;
