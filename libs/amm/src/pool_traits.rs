//! Pool trait definitions for reference-asset / token pools

use crate::error::Result;
use crate::v2_math::V2Math;
use ethers_core::types::U256;
use serde::Serialize;

/// Direction of a swap against a reference-asset pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapDirection {
    ReferenceToToken,
    TokenToReference,
}

/// Snapshot of a pool's holdings, taken once per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolReserves {
    /// Reference-asset side
    pub reference: U256,
    /// Token side
    pub token: U256,
}

impl PoolReserves {
    pub fn new(reference: U256, token: U256) -> Self {
        Self { reference, token }
    }

    pub fn is_degenerate(&self) -> bool {
        self.reference.is_zero() || self.token.is_zero()
    }

    /// `(reserve_in, reserve_out)` for a swap in `direction`
    pub fn oriented(&self, direction: SwapDirection) -> (U256, U256) {
        match direction {
            SwapDirection::ReferenceToToken => (self.reference, self.token),
            SwapDirection::TokenToReference => (self.token, self.reference),
        }
    }
}

/// Unified pool interface for pricing against current reserves
pub trait AmmPool {
    /// Current reserves
    fn reserves(&self) -> PoolReserves;

    /// Output of swapping `amount_in` in `direction`, net of the fee
    fn amount_out(&self, amount_in: U256, direction: SwapDirection) -> Result<U256> {
        let (reserve_in, reserve_out) = self.reserves().oriented(direction);
        V2Math::quote(amount_in, reserve_in, reserve_out)
    }
}

impl AmmPool for PoolReserves {
    fn reserves(&self) -> PoolReserves {
        *self
    }
}
