//! Deposit and withdrawal requests
//!
//! Requests name their two assets in either order. Exactly one of them must
//! be the reference asset; the other identifies the pool.

use crate::error::{ProvisionError, Result};
use ethers::types::{Address, U256};
use serde::Serialize;
use tidepool_amm::BasisPoints;

/// Two assets of a reference-asset pool, in caller order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetPair {
    pub asset_a: Address,
    pub asset_b: Address,
}

impl AssetPair {
    pub fn new(asset_a: Address, asset_b: Address) -> Self {
        Self { asset_a, asset_b }
    }

    /// Build from a slice, which must hold exactly two assets
    pub fn from_slice(assets: &[Address]) -> Result<Self> {
        match assets {
            [asset_a, asset_b] => Ok(Self::new(*asset_a, *asset_b)),
            _ => Err(ProvisionError::invalid_input(format!(
                "expected 2 assets, got {}",
                assets.len()
            ))),
        }
    }

    /// The non-reference side of the pair
    pub fn token(&self, reference: Address) -> Result<Address> {
        match (self.asset_a == reference, self.asset_b == reference) {
            (true, false) => Ok(self.asset_b),
            (false, true) => Ok(self.asset_a),
            (true, true) => Err(ProvisionError::invalid_input(
                "both assets are the reference asset",
            )),
            (false, false) => Err(ProvisionError::invalid_input(
                "neither asset is the reference asset",
            )),
        }
    }
}

/// Amounts a caller wants to deposit, possibly off the pool ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepositRequest {
    pub pair: AssetPair,
    pub amount_a: U256,
    pub amount_b: U256,
    /// Trim the excess side instead of swapping it
    pub prevent_swap: bool,
}

/// A deposit request oriented onto the reference and token sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDeposit {
    pub token: Address,
    pub reference_amount: U256,
    pub token_amount: U256,
    pub prevent_swap: bool,
}

impl DepositRequest {
    pub fn new(asset_a: Address, asset_b: Address, amount_a: U256, amount_b: U256) -> Self {
        Self {
            pair: AssetPair::new(asset_a, asset_b),
            amount_a,
            amount_b,
            prevent_swap: false,
        }
    }

    /// Build from parallel asset and amount slices of length two
    pub fn from_slices(assets: &[Address], amounts: &[U256]) -> Result<Self> {
        if assets.len() != amounts.len() {
            return Err(ProvisionError::invalid_input(format!(
                "{} assets but {} amounts",
                assets.len(),
                amounts.len()
            )));
        }
        let pair = AssetPair::from_slice(assets)?;
        Ok(Self::new(pair.asset_a, pair.asset_b, amounts[0], amounts[1]))
    }

    pub fn with_prevent_swap(mut self, prevent_swap: bool) -> Self {
        self.prevent_swap = prevent_swap;
        self
    }

    pub fn resolve(&self, reference: Address) -> Result<ResolvedDeposit> {
        let token = self.pair.token(reference)?;
        let (reference_amount, token_amount) = if self.pair.asset_a == reference {
            (self.amount_a, self.amount_b)
        } else {
            (self.amount_b, self.amount_a)
        };
        Ok(ResolvedDeposit {
            token,
            reference_amount,
            token_amount,
            prevent_swap: self.prevent_swap,
        })
    }
}

/// Fraction of a position to withdraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    pub pair: AssetPair,
    pub fraction: BasisPoints,
}

impl WithdrawalRequest {
    pub fn new(asset_a: Address, asset_b: Address, fraction_bps: u32) -> Result<Self> {
        Ok(Self {
            pair: AssetPair::new(asset_a, asset_b),
            fraction: BasisPoints::new(fraction_bps)?,
        })
    }

    pub fn from_slices(assets: &[Address], fraction_bps: u32) -> Result<Self> {
        let pair = AssetPair::from_slice(assets)?;
        Self::new(pair.asset_a, pair.asset_b, fraction_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_config::defaults::ETH_SENTINEL;

    fn token() -> Address {
        Address::repeat_byte(0x44)
    }

    #[test]
    fn test_resolve_either_order() {
        let forward = DepositRequest::new(ETH_SENTINEL, token(), U256::from(2_000u64), U256::from(500u64));
        let backward = DepositRequest::new(token(), ETH_SENTINEL, U256::from(500u64), U256::from(2_000u64));

        let expected = ResolvedDeposit {
            token: token(),
            reference_amount: U256::from(2_000u64),
            token_amount: U256::from(500u64),
            prevent_swap: false,
        };
        assert_eq!(forward.resolve(ETH_SENTINEL).unwrap(), expected);
        assert_eq!(backward.resolve(ETH_SENTINEL).unwrap(), expected);
    }

    #[test]
    fn test_pair_without_reference_rejected() {
        let request = DepositRequest::new(token(), Address::repeat_byte(0x55), U256::one(), U256::one());
        assert!(matches!(
            request.resolve(ETH_SENTINEL),
            Err(ProvisionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_pair_of_two_references_rejected() {
        let pair = AssetPair::new(ETH_SENTINEL, ETH_SENTINEL);
        assert!(matches!(pair.token(ETH_SENTINEL), Err(ProvisionError::InvalidInput { .. })));
    }

    #[test]
    fn test_mismatched_slices_rejected() {
        let err = DepositRequest::from_slices(&[ETH_SENTINEL, token()], &[U256::one()]).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidInput { .. }));

        let err = DepositRequest::from_slices(&[ETH_SENTINEL], &[U256::one()]).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidInput { .. }));
    }

    #[test]
    fn test_withdrawal_fraction_bounds() {
        assert!(WithdrawalRequest::new(ETH_SENTINEL, token(), 10_000).is_ok());
        assert!(matches!(
            WithdrawalRequest::new(ETH_SENTINEL, token(), 10_001),
            Err(ProvisionError::InvalidInput { .. })
        ));
        assert!(WithdrawalRequest::from_slices(&[token()], 100).is_err());
    }
}
