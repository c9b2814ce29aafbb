//! Deposit allocation across the two sides of a pool
//!
//! Decides which supplied asset is in excess of the pool ratio and how much of
//! each side ends up deposited, either by rebalancing through a swap or by
//! trimming the excess side when swaps are disallowed. Sides are named
//! `first` and `second`; callers map them onto concrete assets.

use crate::checked;
use crate::error::Result;
use crate::rebalance::RebalancePlanner;
use crate::v2_math::V2Math;
use ethers_core::types::U256;
use serde::Serialize;
use tracing::debug;

/// Which supplied amount is in excess relative to the pool ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Excess {
    First,
    Second,
}

impl Excess {
    /// Cross-multiplied ratio comparison; ties resolve to `First`
    pub fn select(
        first_reserve: U256,
        second_reserve: U256,
        first_amount: U256,
        second_amount: U256,
    ) -> Result<Self> {
        let first_weight = checked::mul(first_amount, second_reserve, "excess selection")?;
        let second_weight = checked::mul(second_amount, first_reserve, "excess selection")?;
        Ok(if first_weight >= second_weight {
            Excess::First
        } else {
            Excess::Second
        })
    }

    pub fn mirrored(self) -> Self {
        match self {
            Excess::First => Excess::Second,
            Excess::Second => Excess::First,
        }
    }
}

/// Final amounts for one deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub excess: Excess,
    /// Amount of the excess side converted before depositing (zero in trim mode)
    pub swap_amount: U256,
    /// Expected output of that conversion
    pub swap_output: U256,
    pub first_deposit: U256,
    pub second_deposit: U256,
}

impl Allocation {
    /// Amount of the excess side consumed in total: swap input plus deposit
    pub fn excess_spent(&self) -> U256 {
        match self.excess {
            Excess::First => self.swap_amount.saturating_add(self.first_deposit),
            Excess::Second => self.swap_amount.saturating_add(self.second_deposit),
        }
    }

    /// Same allocation with the two sides exchanged
    pub fn mirrored(&self) -> Self {
        Self {
            excess: self.excess.mirrored(),
            swap_amount: self.swap_amount,
            swap_output: self.swap_output,
            first_deposit: self.second_deposit,
            second_deposit: self.first_deposit,
        }
    }
}

/// Allocate a deposit of `(first_amount, second_amount)` into a pool holding
/// `(first_reserve, second_reserve)`.
///
/// With `prevent_swap` the scarce side is used in full and the excess side is
/// trimmed to `scarce * excess_reserve / scarce_reserve`. Otherwise the excess
/// side is rebalanced through [`RebalancePlanner::plan`].
pub fn allocate(
    first_reserve: U256,
    second_reserve: U256,
    first_amount: U256,
    second_amount: U256,
    prevent_swap: bool,
) -> Result<Allocation> {
    V2Math::ensure_reserves(first_reserve, second_reserve)?;
    let excess = Excess::select(first_reserve, second_reserve, first_amount, second_amount)?;

    let allocation = match (excess, prevent_swap) {
        (Excess::First, true) => Allocation {
            excess,
            swap_amount: U256::zero(),
            swap_output: U256::zero(),
            first_deposit: V2Math::proportional_amount(second_amount, second_reserve, first_reserve)?,
            second_deposit: second_amount,
        },
        (Excess::Second, true) => Allocation {
            excess,
            swap_amount: U256::zero(),
            swap_output: U256::zero(),
            first_deposit: first_amount,
            second_deposit: V2Math::proportional_amount(first_amount, first_reserve, second_reserve)?,
        },
        (Excess::First, false) => {
            let plan = RebalancePlanner::plan(first_reserve, second_reserve, first_amount, second_amount)?;
            Allocation {
                excess,
                swap_amount: plan.swap_amount,
                swap_output: plan.swap_output,
                first_deposit: plan.final_major,
                second_deposit: plan.final_minor,
            }
        }
        (Excess::Second, false) => {
            let plan = RebalancePlanner::plan(second_reserve, first_reserve, second_amount, first_amount)?;
            Allocation {
                excess,
                swap_amount: plan.swap_amount,
                swap_output: plan.swap_output,
                first_deposit: plan.final_minor,
                second_deposit: plan.final_major,
            }
        }
    };

    debug!(
        ?excess,
        prevent_swap,
        swap = %allocation.swap_amount,
        first = %allocation.first_deposit,
        second = %allocation.second_deposit,
        "allocated deposit"
    );

    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_first_side_excess_rebalances() {
        let allocation = allocate(u(100_000), u(50_000), u(2_000), u(500), false).unwrap();

        assert_eq!(allocation.excess, Excess::First);
        assert_eq!(allocation.swap_amount, u(500));
        assert_eq!(allocation.first_deposit, u(1_500));
        assert_eq!(allocation.second_deposit, u(742));
        assert_eq!(allocation.excess_spent(), u(2_000));
    }

    #[test]
    fn test_second_side_excess_mirrors_first() {
        let forward = allocate(u(100_000), u(50_000), u(2_000), u(500), false).unwrap();
        let mirrored = allocate(u(50_000), u(100_000), u(500), u(2_000), false).unwrap();

        assert_eq!(mirrored.excess, Excess::Second);
        assert_eq!(mirrored, forward.mirrored());
    }

    #[test]
    fn test_tie_selects_first() {
        let excess = Excess::select(u(100), u(200), u(10), u(20)).unwrap();
        assert_eq!(excess, Excess::First);
    }

    #[test]
    fn test_prevent_swap_trims_excess_side() {
        // 2000 first vs 500 second at 2:1 -> second is scarce, first trimmed to 1000
        let allocation = allocate(u(100_000), u(50_000), u(2_000), u(500), true).unwrap();

        assert_eq!(allocation.excess, Excess::First);
        assert!(allocation.swap_amount.is_zero());
        assert_eq!(allocation.first_deposit, u(1_000));
        assert_eq!(allocation.second_deposit, u(500));
    }

    #[test]
    fn test_prevent_swap_trims_second_side() {
        let allocation = allocate(u(100_000), u(50_000), u(600), u(500), true).unwrap();

        assert_eq!(allocation.excess, Excess::Second);
        assert_eq!(allocation.first_deposit, u(600));
        assert_eq!(allocation.second_deposit, u(300));
    }

    #[test]
    fn test_empty_pool_rejected_before_selection() {
        assert!(allocate(u(0), u(0), u(1), u(1), true).is_err());
    }
}
