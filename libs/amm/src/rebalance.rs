//! Single-sided rebalancing before a liquidity deposit
//!
//! Given a deposit where one asset ("major") is in excess of the pool ratio,
//! computes how much of it to swap into the other asset ("minor") and the two
//! amounts to deposit afterwards. The planner never decides which side is in
//! excess; see [`crate::allocation`] for that.

use crate::checked;
use crate::error::{AmmError, Result};
use crate::v2_math::{V2Math, FEE_DENOMINATOR, FEE_NUMERATOR};
use ethers_core::types::U256;
use serde::Serialize;
use tracing::debug;

/// Closed-form divisor used to size the pre-deposit swap (`1000 + 997`).
///
/// This is a single-step approximation of the fee curve, not its exact
/// inverse. The resulting deposit ratio can be slightly off; the clamp in
/// [`RebalancePlanner::plan`] keeps it within the supplied funds.
pub const REBALANCE_DIVISOR: u64 = FEE_DENOMINATOR + FEE_NUMERATOR;

/// Outcome of rebalancing one deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapPlan {
    /// Amount of the major asset to swap away
    pub swap_amount: U256,
    /// Minor asset expected back from that swap at the snapshotted reserves
    pub swap_output: U256,
    /// Major asset left to deposit
    pub final_major: U256,
    /// Minor asset to deposit
    pub final_minor: U256,
}

impl SwapPlan {
    /// True when the deposit can go ahead without any conversion
    pub fn is_swapless(&self) -> bool {
        self.swap_amount.is_zero()
    }
}

pub struct RebalancePlanner;

impl RebalancePlanner {
    /// Plan the swap and final deposit amounts for an excess of the major asset
    ///
    /// The sequence below is evaluated exactly in this order with floor
    /// division; reordering any product changes the result.
    ///
    /// 1. `minor_value = minor_amount * major_reserve / minor_reserve`
    /// 2. `swap = (major_amount - minor_value) * 1000 / 1997`
    /// 3. `swap_output = quote(swap, major_reserve, minor_reserve)`
    /// 4. `final_major = major_amount - swap`
    /// 5. `final_minor = final_major * (minor_reserve - swap_output) / (major_reserve + swap)`
    /// 6. if `final_minor > minor_amount + swap_output`, clamp it there and
    ///    recompute `final_major` from the clamped value
    ///
    /// Fails with [`AmmError::DegeneratePool`] on an empty reserve and with
    /// [`AmmError::InsufficientLiquidity`] if the swap would take the whole
    /// minor reserve.
    pub fn plan(
        major_reserve: U256,
        minor_reserve: U256,
        major_amount: U256,
        minor_amount: U256,
    ) -> Result<SwapPlan> {
        V2Math::ensure_reserves(major_reserve, minor_reserve)?;

        let minor_value_in_major =
            checked::mul_div(minor_amount, major_reserve, minor_reserve, "minor value in major")?;
        let excess = checked::sub(major_amount, minor_value_in_major, "major excess")?;
        let swap_amount = checked::mul_div(
            excess,
            U256::from(FEE_DENOMINATOR),
            U256::from(REBALANCE_DIVISOR),
            "rebalance swap size",
        )?;
        let swap_output = V2Math::quote(swap_amount, major_reserve, minor_reserve)?;

        if minor_reserve <= swap_output {
            return Err(AmmError::InsufficientLiquidity {
                reserve: minor_reserve,
                requested: swap_output,
            });
        }

        let minor_reserve_after = minor_reserve - swap_output;
        let major_reserve_after = checked::add(major_reserve, swap_amount, "post-swap major reserve")?;

        let mut final_major = major_amount - swap_amount;
        let mut final_minor = checked::mul_div(
            final_major,
            minor_reserve_after,
            major_reserve_after,
            "final minor amount",
        )?;

        let minor_cap = checked::add(minor_amount, swap_output, "minor cap")?;
        if final_minor > minor_cap {
            debug!(
                "clamping minor deposit {} to available {}",
                final_minor, minor_cap
            );
            final_minor = minor_cap;
            final_major = checked::mul_div(
                final_minor,
                major_reserve_after,
                minor_reserve_after,
                "clamped major amount",
            )?;
        }

        Ok(SwapPlan {
            swap_amount,
            swap_output,
            final_major,
            final_minor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_reference_scenario() {
        let plan = RebalancePlanner::plan(u(100_000), u(50_000), u(2_000), u(500)).unwrap();

        assert_eq!(plan.swap_amount, u(500));
        assert_eq!(plan.swap_output, u(248));
        assert_eq!(plan.final_major, u(1_500));
        assert_eq!(plan.final_minor, u(742));
    }

    #[test]
    fn test_balanced_inputs_need_no_swap() {
        let plan = RebalancePlanner::plan(u(100_000), u(50_000), u(2_000), u(1_000)).unwrap();

        assert!(plan.is_swapless());
        assert_eq!(plan.final_major, u(2_000));
        assert_eq!(plan.final_minor, u(1_000));
    }

    #[test]
    fn test_clamp_limits_minor_to_supply() {
        // One unit of excess is too small to swap, so the ratio alone would
        // ask for 1001 minor units while only 1000 were supplied.
        let plan = RebalancePlanner::plan(u(1_000), u(1_000), u(1_001), u(1_000)).unwrap();

        assert!(plan.is_swapless());
        assert_eq!(plan.final_minor, u(1_000));
        assert_eq!(plan.final_major, u(1_000));
    }

    #[test]
    fn test_single_sided_deposit() {
        let plan = RebalancePlanner::plan(u(1_000), u(1_000), u(1_000), u(0)).unwrap();

        assert_eq!(plan.swap_amount, u(500));
        assert_eq!(plan.swap_output, u(332));
        assert_eq!(plan.final_major, u(500));
        assert_eq!(plan.final_minor, u(222));
    }

    #[test]
    fn test_minor_in_excess_is_rejected() {
        let err = RebalancePlanner::plan(u(1_000), u(1_000), u(10), u(500)).unwrap_err();
        assert!(matches!(err, AmmError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_empty_pool_is_degenerate() {
        assert!(matches!(
            RebalancePlanner::plan(u(0), u(1_000), u(10), u(5)),
            Err(AmmError::DegeneratePool { .. })
        ));
        assert!(matches!(
            RebalancePlanner::plan(u(1_000), u(0), u(10), u(5)),
            Err(AmmError::DegeneratePool { .. })
        ));
    }
}
