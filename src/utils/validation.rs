//! Input validation utilities.
//!
//! Validation functions applied before any state change; every failure here
//! is fail-fast and leaves the ledgers untouched.

use crate::error::{Error, Result};
use crate::utils::address::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate that an amount is non-zero
pub fn validate_non_zero(amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate that an address is not the null address
pub fn validate_address(address: &Address) -> Result<()> {
    if address.is_zero() {
        return Err(Error::InvalidAddress);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_zero() {
        assert!(validate_non_zero(0).is_err());
        assert!(validate_non_zero(1).is_ok());
        assert!(validate_non_zero(u128::MAX).is_ok());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(&Address::ZERO).is_err());
        assert!(validate_address(&Address::from_seed(b"user")).is_ok());
    }
}
