//! Constant-product swap pricing with exact integer arithmetic
//!
//! Amounts and reserves are raw on-chain units held in `U256`. Every product
//! is formed before any division and floored, so the results match what the
//! pool contract itself computes.

use crate::checked;
use crate::error::{AmmError, Result};
use ethers_core::types::U256;

/// Fee-adjusted multiplier applied to swap inputs (0.3% fee)
pub const FEE_NUMERATOR: u64 = 997;

/// Denominator paired with [`FEE_NUMERATOR`]
pub const FEE_DENOMINATOR: u64 = 1000;

/// Constant-product math shared by the planner, the orchestrator and any
/// simulated pool
pub struct V2Math;

impl V2Math {
    /// Output obtainable from a single swap of `amount_in`, net of the fee
    ///
    /// ```text
    /// out = floor(in * 997 * reserve_out / (reserve_in * 1000 + in * 997))
    /// ```
    ///
    /// A zero input quotes zero without touching the reserves.
    pub fn quote(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }
        Self::ensure_reserves(reserve_in, reserve_out)?;

        let fee_adjusted_input =
            checked::mul(amount_in, U256::from(FEE_NUMERATOR), "fee-adjusted input")?;
        let numerator = checked::mul(fee_adjusted_input, reserve_out, "quote numerator")?;
        let denominator = checked::add(
            checked::mul(reserve_in, U256::from(FEE_DENOMINATOR), "quote denominator")?,
            fee_adjusted_input,
            "quote denominator",
        )?;

        checked::div(numerator, denominator, "quote")
    }

    /// Amount of the other asset worth `amount` at the current reserve ratio,
    /// with no fee and no price impact: `floor(amount * reserve_to / reserve_from)`
    pub fn proportional_amount(amount: U256, reserve_from: U256, reserve_to: U256) -> Result<U256> {
        Self::ensure_reserves(reserve_from, reserve_to)?;
        checked::mul_div(amount, reserve_to, reserve_from, "proportional amount")
    }

    /// Reject pools where either side is empty
    pub fn ensure_reserves(reserve_in: U256, reserve_out: U256) -> Result<()> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::DegeneratePool {
                input_reserve: reserve_in,
                output_reserve: reserve_out,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_quote_reference_value() {
        // 500 * 997 * 50000 / (100000 * 1000 + 500 * 997) = 248.01..
        let out = V2Math::quote(u(500), u(100_000), u(50_000)).unwrap();
        assert_eq!(out, u(248));
    }

    #[test]
    fn test_quote_zero_input() {
        assert_eq!(V2Math::quote(u(0), u(1), u(1)).unwrap(), U256::zero());
        // Zero input short-circuits even on an empty pool
        assert_eq!(V2Math::quote(u(0), u(0), u(0)).unwrap(), U256::zero());
    }

    #[test]
    fn test_quote_empty_pool_is_degenerate() {
        assert!(matches!(
            V2Math::quote(u(10), u(0), u(1_000)),
            Err(AmmError::DegeneratePool { .. })
        ));
        assert!(matches!(
            V2Math::quote(u(10), u(1_000), u(0)),
            Err(AmmError::DegeneratePool { .. })
        ));
    }

    #[test]
    fn test_quote_never_drains_output() {
        let out = V2Math::quote(u(1_000_000_000), u(1_000), u(2_000)).unwrap();
        assert!(out < u(2_000));
    }

    #[test]
    fn test_quote_overflow_detected() {
        let err = V2Math::quote(U256::MAX / 2, u(1), u(1)).unwrap_err();
        assert!(matches!(err, AmmError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_proportional_amount_floors() {
        assert_eq!(
            V2Math::proportional_amount(u(500), u(50_000), u(100_000)).unwrap(),
            u(1_000)
        );
        assert_eq!(V2Math::proportional_amount(u(10), u(3), u(1)).unwrap(), u(3));
    }
}
