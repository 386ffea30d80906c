//! Engine events for state change notifications.
//!
//! Events are the durable, externally observable record of engine state
//! transitions. Exactly one event is recorded per successful operation,
//! after the supply effect and the ledger update.

use serde::{Deserialize, Serialize};

use crate::core::token::TokenAmount;
use crate::utils::address::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// All engine event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Collateral was deposited and burned for USD credit
    CollateralDeposited(CollateralDepositedEvent),
    /// USD credit was redeemed for freshly minted collateral
    CollateralRedeemed(CollateralRedeemedEvent),
}

impl EngineEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CollateralDeposited(_) => "CollateralDeposited",
            Self::CollateralRedeemed(_) => "CollateralRedeemed",
        }
    }

    /// The user the event concerns
    pub fn user(&self) -> Address {
        match self {
            Self::CollateralDeposited(e) => e.user,
            Self::CollateralRedeemed(e) => e.user,
        }
    }

    /// The token amount moved
    pub fn token_amount(&self) -> TokenAmount {
        match self {
            Self::CollateralDeposited(e) => e.token_amount,
            Self::CollateralRedeemed(e) => e.token_amount,
        }
    }
}

/// Collateral deposited and burned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralDepositedEvent {
    /// Depositor
    pub user: Address,
    /// Token amount burned
    pub token_amount: TokenAmount,
}

/// Credit redeemed for minted collateral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRedeemedEvent {
    /// Redeemer
    pub user: Address,
    /// Token amount minted
    pub token_amount: TokenAmount,
}
