//! Fixed-point arithmetic and conversion functions.
//!
//! This module provides safe integer arithmetic with overflow protection and
//! the two unit conversions at the heart of the engine: token units to USD
//! base units and back, through a single oracle price.
//!
//! The ordering discipline is mandatory: multiply before divide, and divide
//! last, so intermediate truncation never discards significant digits. The
//! pair of conversions is rounding-consistent: converting a USD value to
//! tokens and back never increases the USD value.

use crate::error::{Error, Result};
use crate::utils::constants::{FEED_PRECISION_GAP, PRECISION};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b).ok_or(Error::Underflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b).ok_or(Error::Overflow {
        operation: format!("{} * {}", a, b),
    })
}

/// Safe multiplication then truncating division
///
/// Computes `(a * b) / c` with the product checked for overflow and the
/// division performed last.
pub fn safe_mul_div(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(Error::DivisionByZero {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let product = safe_mul(a, b)?;
    Ok(product / c)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE PRICE SCALING
// ═══════════════════════════════════════════════════════════════════════════════

/// Scale a raw oracle answer (8 decimals, signed) up to internal precision.
///
/// Negative answers clamp to zero. No positivity or staleness validation is
/// performed here; the oracle is trusted as-is and a misbehaving feed yields
/// a zero scaled price, which the token-side conversion reports as a
/// division-by-zero error.
pub fn scale_oracle_answer(answer: i128) -> u128 {
    if answer <= 0 {
        return 0;
    }
    // 10^8 * 10^10 = 10^18, so any sane price fits comfortably in u128
    (answer as u128).saturating_mul(FEED_PRECISION_GAP)
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNIT CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// USD value of `token_amount` base units at `scaled_price`, truncating.
///
/// `usd = token_amount * scaled_price / PRECISION`
pub fn usd_value_of_tokens(token_amount: u128, scaled_price: u128) -> Result<u128> {
    // scaled_price is a multiple of FEED_PRECISION_GAP by construction;
    // cancelling the exact common factor keeps realistic amounts inside
    // u128 without changing the truncated result
    safe_mul_div(
        token_amount,
        scaled_price / FEED_PRECISION_GAP,
        PRECISION / FEED_PRECISION_GAP,
    )
}

/// Token base units worth `usd_value` at `scaled_price`, truncating.
///
/// `tokens = usd_value * PRECISION / scaled_price`
///
/// A zero scaled price (broken oracle) surfaces as `DivisionByZero`.
pub fn tokens_for_usd_value(usd_value: u128, scaled_price: u128) -> Result<u128> {
    safe_mul_div(
        usd_value,
        PRECISION / FEED_PRECISION_GAP,
        scaled_price / FEED_PRECISION_GAP,
    )
}
