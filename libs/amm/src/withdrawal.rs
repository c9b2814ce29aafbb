//! Proportional withdrawal of pool shares

use crate::checked;
use crate::error::{AmmError, Result};
use ethers_core::types::U256;
use serde::Serialize;
use std::fmt;

/// Upper bound of a fraction expressed in basis points
pub const MAX_BPS: u32 = 10_000;

/// A fraction in basis points, guaranteed to lie in `[0, 10000]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(MAX_BPS);

    pub fn new(bps: u32) -> Result<Self> {
        if bps > MAX_BPS {
            return Err(AmmError::InvalidFraction { bps });
        }
        Ok(Self(bps))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for BasisPoints {
    type Error = AmmError;

    fn try_from(bps: u32) -> Result<Self> {
        Self::new(bps)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

/// Pool shares to redeem for `fraction` of `share_balance`, floored
pub fn withdrawal_amount(share_balance: U256, fraction: BasisPoints) -> Result<U256> {
    checked::mul_div(
        share_balance,
        U256::from(fraction.get()),
        U256::from(MAX_BPS),
        "withdrawal amount",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_withdrawal() {
        let amount = withdrawal_amount(U256::from(10_000u64), BasisPoints::new(2_500).unwrap()).unwrap();
        assert_eq!(amount, U256::from(2_500u64));
    }

    #[test]
    fn test_full_and_empty_fractions() {
        let shares = U256::from(123_456_789u64);
        assert_eq!(withdrawal_amount(shares, BasisPoints::FULL).unwrap(), shares);
        assert_eq!(withdrawal_amount(shares, BasisPoints::ZERO).unwrap(), U256::zero());
    }

    #[test]
    fn test_fraction_floors() {
        // 3 * 3333 / 10000 = 0.9999
        let amount = withdrawal_amount(U256::from(3u8), BasisPoints::new(3_333).unwrap()).unwrap();
        assert_eq!(amount, U256::zero());
    }

    #[test]
    fn test_out_of_range_fraction() {
        assert_eq!(
            BasisPoints::new(10_001),
            Err(AmmError::InvalidFraction { bps: 10_001 })
        );
        assert!(BasisPoints::try_from(10_000).is_ok());
    }
}
