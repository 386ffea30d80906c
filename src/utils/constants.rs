//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Internal fixed-point precision used for all USD/token conversions (10^18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Number of decimal places the price oracle reports
pub const ORACLE_DECIMALS: u32 = 8;

/// Scale-up factor from oracle precision (10^8) to internal precision (10^18)
pub const FEED_PRECISION_GAP: u128 = 10_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL TOKEN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral token decimals (same scale as internal precision)
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole collateral token in base units
pub const TOKEN_BASE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Default collateral token name
pub const TOKEN_NAME: &str = "Volatile Collateral";

/// Default collateral token symbol
pub const TOKEN_SYMBOL: &str = "VOLT";

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum events retained in an in-memory event log before pruning
pub const MAX_EVENT_LOG: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a state hash in bytes
pub const HASH_LENGTH: usize = 32;
