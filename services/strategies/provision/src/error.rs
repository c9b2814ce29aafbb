//! Error types for liquidity provisioning
//!
//! Every failed deposit, withdrawal or query surfaces as exactly one of these
//! variants. Nothing is retried or recovered locally; the caller re-submits.

use ethers::types::{Address, U256};
use thiserror::Error;
use tidepool_amm::AmmError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// Malformed request: wrong asset pair, bad fraction, mismatched lengths
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Insufficient balance of {asset:?}: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: Address,
        requested: U256,
        available: U256,
    },

    #[error("No pool registered for token {token:?}")]
    PoolNotFound { token: Address },

    #[error("Degenerate pool: reserves ({reserve_in}, {reserve_out}) must both be non-zero")]
    DegeneratePool { reserve_in: U256, reserve_out: U256 },

    #[error("Insufficient liquidity: output {requested} would exhaust reserve {reserve}")]
    InsufficientLiquidity { reserve: U256, requested: U256 },

    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    /// A registry, ledger or wallet call reported failure
    #[error("External call {call} failed: {reason}")]
    ExternalCallFailure { call: String, reason: String },
}

impl ProvisionError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<AmmError> for ProvisionError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::DegeneratePool {
                input_reserve,
                output_reserve,
            } => Self::DegeneratePool {
                reserve_in: input_reserve,
                reserve_out: output_reserve,
            },
            AmmError::InsufficientLiquidity { reserve, requested } => {
                Self::InsufficientLiquidity { reserve, requested }
            }
            AmmError::ArithmeticOverflow { operation } => Self::ArithmeticOverflow { operation },
            AmmError::InvalidFraction { bps } => Self::InvalidInput {
                reason: format!("fraction {} bps outside [0, 10000]", bps),
            },
        }
    }
}

/// Failure reported by an external collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{call}: {reason}")]
pub struct CollaboratorError {
    pub call: String,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(call: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            reason: reason.into(),
        }
    }
}

impl From<CollaboratorError> for ProvisionError {
    fn from(err: CollaboratorError) -> Self {
        Self::ExternalCallFailure {
            call: err.call,
            reason: err.reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fraction_is_invalid_input() {
        let err: ProvisionError = AmmError::InvalidFraction { bps: 20_000 }.into();
        assert!(matches!(err, ProvisionError::InvalidInput { .. }));
    }

    #[test]
    fn test_collaborator_failure_keeps_call_name() {
        let err: ProvisionError = CollaboratorError::new("removeLiquidity", "expired").into();
        assert_eq!(
            err,
            ProvisionError::ExternalCallFailure {
                call: "removeLiquidity".to_string(),
                reason: "expired".to_string(),
            }
        );
    }
}
