//! Price feed interface.
//!
//! The engine depends on a single injected price-reporting capability. The
//! feed is trusted as the sole source of truth: the engine reads it
//! synchronously on every conversion, never caches a round across
//! operations, and performs no staleness or positivity validation on the
//! answer. A misbehaving feed therefore produces degenerate conversions
//! rather than a clean domain error; that gap is deliberate and documented
//! at the interface boundary here.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::address::Address;
use crate::utils::constants::ORACLE_DECIMALS;
use crate::utils::math::scale_oracle_answer;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE ROUND
// ═══════════════════════════════════════════════════════════════════════════════

/// One price sample as reported by the oracle.
///
/// Immutable once read; authoritative for the duration of a single engine
/// operation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRound {
    /// Monotonically increasing round identifier
    pub round_id: u64,
    /// Unit price of the collateral asset, scaled by 10^8, signed
    pub answer: i128,
    /// Unix timestamp at which the round was started
    pub started_at: u64,
    /// Unix timestamp at which the answer was last updated
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
}

impl PriceRound {
    /// Number of decimals in `answer`
    pub const DECIMALS: u32 = ORACLE_DECIMALS;

    /// The answer scaled up to internal precision (negative answers clamp
    /// to zero)
    pub fn scaled_answer(&self) -> u128 {
        scale_oracle_answer(self.answer)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE FEED TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// An injected price-reporting capability.
///
/// Implementations report the latest known round. The engine owns nothing
/// about the feed's internal update mechanism; substitutable test doubles
/// implement this trait with deterministic, controllable samples.
pub trait PriceFeed {
    /// The feed's on-ledger identity
    fn address(&self) -> Address;

    /// The latest known price round
    fn latest_round_data(&self) -> Result<PriceRound>;
}
