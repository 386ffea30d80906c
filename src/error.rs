//! Error types for the stablecredit engine.
//!
//! This module defines all error types used throughout the crate,
//! providing clear and actionable error messages.

use thiserror::Error;

/// Result type alias for stablecredit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the stablecredit engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Input Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Amount is zero
    #[error("Amount must be more than zero")]
    ZeroAmount,

    /// Null address where a real one is required
    #[error("Invalid address: the null address is not allowed")]
    InvalidAddress,

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Caller is not the authorized controller or owner
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════
    // Funds Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Redemption request exceeds recorded USD credit
    #[error("Insufficient credit: requested {requested}, available {available}")]
    InsufficientCredit {
        /// Requested USD value
        requested: u128,
        /// Available USD credit
        available: u128,
    },

    /// Token balance too low for the requested operation
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Required token amount
        required: u128,
        /// Available token amount
        available: u128,
    },

    /// Spender allowance too low for the requested transfer
    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance {
        /// Required token amount
        required: u128,
        /// Approved token amount
        approved: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Upstream Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The deposit pull-transfer reported failure
    #[error("Collateral transfer failed: {0}")]
    TransferFailed(String),

    /// The price feed could not produce a round at all
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════
    // State Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Token supply operations are paused
    #[error("Token is paused")]
    TokenPaused,

    /// Nested call into a guarded entry point
    #[error("Reentrant call rejected")]
    ReentrantCall,

    /// Invariant violation detected
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Underflow in calculation
    #[error("Arithmetic underflow in {operation}")]
    Underflow {
        /// Operation that underflowed
        operation: String,
    },

    /// Division by zero (e.g. conversion against a zero oracle price)
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// Operation that divided by zero
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if this error is recoverable by resubmitting with
    /// different inputs or after external state changes
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ZeroAmount
                | Error::InsufficientCredit { .. }
                | Error::InsufficientBalance { .. }
                | Error::InsufficientAllowance { .. }
                | Error::TransferFailed(_)
                | Error::TokenPaused
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::InvariantViolation(_)
                | Error::Overflow { .. }
                | Error::Underflow { .. }
                | Error::ReentrantCall
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors: 1xxx
            Error::ZeroAmount => 1001,
            Error::InvalidAddress => 1002,
            Error::InvalidParameter { .. } => 1003,

            // Authorization errors: 2xxx
            Error::Unauthorized(_) => 2001,

            // Funds errors: 3xxx
            Error::InsufficientCredit { .. } => 3001,
            Error::InsufficientBalance { .. } => 3002,
            Error::InsufficientAllowance { .. } => 3003,

            // Upstream errors: 4xxx
            Error::TransferFailed(_) => 4001,
            Error::OracleUnavailable(_) => 4002,

            // State errors: 5xxx
            Error::TokenPaused => 5001,
            Error::ReentrantCall => 5002,
            Error::InvariantViolation(_) => 5003,

            // Arithmetic errors: 6xxx
            Error::Overflow { .. } => 6001,
            Error::Underflow { .. } => 6002,
            Error::DivisionByZero { .. } => 6003,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::ZeroAmount.code(),
            Error::InvalidAddress.code(),
            Error::InvalidParameter { name: "".into(), reason: "".into() }.code(),
            Error::Unauthorized("".into()).code(),
            Error::InsufficientCredit { requested: 0, available: 0 }.code(),
            Error::InsufficientBalance { required: 0, available: 0 }.code(),
            Error::InsufficientAllowance { required: 0, approved: 0 }.code(),
            Error::TransferFailed("".into()).code(),
            Error::OracleUnavailable("".into()).code(),
            Error::TokenPaused.code(),
            Error::ReentrantCall.code(),
            Error::InvariantViolation("".into()).code(),
            Error::Overflow { operation: "".into() }.code(),
            Error::Underflow { operation: "".into() }.code(),
            Error::DivisionByZero { operation: "".into() }.code(),
            Error::Serialization("".into()).code(),
            Error::Deserialization("".into()).code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientCredit {
            requested: 1000,
            available: 500,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::InsufficientCredit { requested: 0, available: 0 }.is_recoverable());
        assert!(Error::TokenPaused.is_recoverable());
        assert!(!Error::InvariantViolation("test".into()).is_recoverable());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::InvariantViolation("test".into()).is_critical());
        assert!(Error::Overflow { operation: "test".into() }.is_critical());
        assert!(Error::ReentrantCall.is_critical());
        assert!(!Error::ZeroAmount.is_critical());
    }
}
