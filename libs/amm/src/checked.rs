//! Checked 256-bit arithmetic
//!
//! Thin wrappers over the `U256` checked operations that turn `None` into
//! [`AmmError::ArithmeticOverflow`] tagged with the operation that failed.
//! Division is always floor division; callers order multiplications before
//! divisions themselves.

use crate::error::{AmmError, Result};
use ethers_core::types::U256;

#[inline]
pub fn mul(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_mul(b)
        .ok_or(AmmError::ArithmeticOverflow { operation })
}

#[inline]
pub fn add(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_add(b)
        .ok_or(AmmError::ArithmeticOverflow { operation })
}

/// Subtraction; a negative result is reported as leaving the unsigned range.
#[inline]
pub fn sub(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_sub(b)
        .ok_or(AmmError::ArithmeticOverflow { operation })
}

/// Floor division. A zero divisor is a degenerate-pool condition since every
/// divisor in this crate is derived from pool reserves.
#[inline]
pub fn div(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    if b.is_zero() {
        tracing::debug!("division by zero in {}", operation);
        return Err(AmmError::DegeneratePool {
            input_reserve: a,
            output_reserve: b,
        });
    }
    Ok(a / b)
}

/// `a * b / c` with the product computed first.
#[inline]
pub fn mul_div(a: U256, b: U256, c: U256, operation: &'static str) -> Result<U256> {
    div(mul(a, b, operation)?, c, operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_overflow_is_reported() {
        let err = mul(U256::MAX, U256::from(2u8), "test product").unwrap_err();
        assert_eq!(
            err,
            AmmError::ArithmeticOverflow {
                operation: "test product"
            }
        );
    }

    #[test]
    fn test_sub_underflow_is_reported() {
        assert!(matches!(
            sub(U256::from(1u8), U256::from(2u8), "test difference"),
            Err(AmmError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_mul_div_floors() {
        let result = mul_div(U256::from(7u8), U256::from(3u8), U256::from(2u8), "t").unwrap();
        assert_eq!(result, U256::from(10u8));
    }

    #[test]
    fn test_div_by_zero_is_degenerate() {
        assert!(matches!(
            div(U256::from(1u8), U256::zero(), "t"),
            Err(AmmError::DegeneratePool { .. })
        ));
    }
}
