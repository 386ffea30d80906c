//! Stability engine - the collateral-to-value accounting core.
//!
//! Users surrender collateral tokens and receive credit denominated in a
//! stable unit of account; later they redeem that credit for a freshly
//! issued amount of collateral computed from the then-current oracle price.
//! The engine holds no collateral on a steady-state basis: tokens pulled in
//! on deposit are immediately burned, and tokens paid out on redemption are
//! freshly minted.
//!
//! All conversions go through a single fixed-point precision with the
//! multiply-before-divide discipline, so a USD value converted to tokens
//! and back never gains value. Redemption debits the USD-equivalent of the
//! tokens actually minted (post-truncation): the tokens, not the requested
//! dollar figure, are the ground truth of value moved.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::events::{CollateralDepositedEvent, CollateralRedeemedEvent, EngineEvent};
use crate::core::token::{CollateralToken, TokenAmount};
use crate::error::{Error, Result};
use crate::oracle::price_feed::{PriceFeed, PriceRound};
use crate::utils::address::{Address, StateHash};
use crate::utils::constants::{MAX_EVENT_LOG, PRECISION};
use crate::utils::math::{tokens_for_usd_value, usd_value_of_tokens};
use crate::utils::validation::validate_non_zero;

// ═══════════════════════════════════════════════════════════════════════════════
// USD AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed USD credit amount in base units at internal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UsdAmount(u128);

impl UsdAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from base units
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Create from whole dollars (scales up by the internal precision)
    pub const fn from_dollars(dollars: u128) -> Self {
        Self(dollars * PRECISION)
    }

    /// Get raw base-unit value
    pub fn base_units(&self) -> u128 {
        self.0
    }

    /// Get value in whole dollars (truncated)
    pub fn dollars(&self) -> u128 {
        self.0 / PRECISION
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl std::fmt::Display for UsdAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:018}", self.0 / PRECISION, self.0 % PRECISION)
    }
}

impl From<u128> for UsdAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<UsdAmount> for u128 {
    fn from(amount: UsdAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE STATE SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Serializable engine state (everything except the injected price feed)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineState {
    address: Address,
    token: CollateralToken,
    credit: HashMap<Address, UsdAmount>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STABILITY ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The collateral-to-value accounting engine
#[derive(Debug)]
pub struct StabilityEngine<F: PriceFeed> {
    /// The engine's own ledger identity (the token's bound controller)
    address: Address,
    /// The collateral token whose supply the engine controls
    token: CollateralToken,
    /// Injected price-reporting capability
    feed: F,
    /// Per-user USD credit ledger; entries persist at zero, never deleted
    credit: HashMap<Address, UsdAmount>,
    /// Reentrancy flag: idle (false) or in-call (true)
    entered: bool,
    /// Recent events (for client-side tracking)
    events: Vec<EngineEvent>,
    /// Maximum events to keep in memory
    max_events: usize,
}

impl<F: PriceFeed> StabilityEngine<F> {
    /// Create an engine over `token` and `feed`.
    ///
    /// The token must already have `address` bound as its controller;
    /// otherwise the engine could not burn or mint and every operation
    /// would fail mid-flight.
    pub fn new(address: Address, token: CollateralToken, feed: F) -> Result<Self> {
        if token.controller() != Some(address) {
            return Err(Error::Unauthorized(
                "the engine address must be the token's bound controller".into(),
            ));
        }
        Ok(Self {
            address,
            token,
            feed,
            credit: HashMap::new(),
            entered: false,
            events: Vec::new(),
            max_events: MAX_EVENT_LOG,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENTRY POINTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit collateral: pull `amount` from `caller`, burn it, and credit
    /// the caller's USD ledger with its value at the current price.
    ///
    /// Returns the USD value credited. The caller must have approved the
    /// engine for at least `amount` beforehand; a failing pull surfaces as
    /// `TransferFailed` with the token's own reason.
    pub fn deposit_collateral(&mut self, caller: Address, amount: TokenAmount) -> Result<UsdAmount> {
        self.non_reentrant(|engine| {
            validate_non_zero(amount.base_units())?;

            // One oracle read per operation, authoritative for its duration
            let round = engine.read_price()?;
            let usd = UsdAmount::from_base_units(usd_value_of_tokens(
                amount.base_units(),
                round.scaled_answer(),
            )?);

            // Validate the ledger update before any supply effect so the
            // operation stays all-or-nothing
            let new_credit = engine
                .credit_of(&caller)
                .checked_add(usd)
                .ok_or(Error::Overflow {
                    operation: "deposit credit".into(),
                })?;

            // Pull, then burn: the engine's balance is non-zero only inside
            // this window
            let engine_address = engine.address;
            engine
                .token
                .transfer_from(engine_address, caller, engine_address, amount)
                .map_err(|e| Error::TransferFailed(e.to_string()))?;
            engine.token.burn(engine_address, amount)?;

            engine.credit.insert(caller, new_credit);

            tracing::info!(
                user = %caller.short(),
                tokens = %amount,
                usd = %usd,
                "collateral deposited and burned"
            );

            engine.add_event(EngineEvent::CollateralDeposited(CollateralDepositedEvent {
                user: caller,
                token_amount: amount,
            }));

            Ok(usd)
        })
    }

    /// Redeem `usd_value` of credit for freshly minted collateral at the
    /// current price.
    ///
    /// Returns the token amount minted: `floor(usd_value / price)` whole
    /// base units. The credit debit is the USD-equivalent of the tokens
    /// actually minted, which may be strictly less than `usd_value` due to
    /// truncation; redeeming less than the value of one base unit mints
    /// nothing and debits nothing.
    pub fn redeem_collateral(&mut self, caller: Address, usd_value: UsdAmount) -> Result<TokenAmount> {
        self.non_reentrant(|engine| {
            validate_non_zero(usd_value.base_units())?;

            let available = engine.credit_of(&caller);
            if available < usd_value {
                return Err(Error::InsufficientCredit {
                    requested: usd_value.base_units(),
                    available: available.base_units(),
                });
            }

            let round = engine.read_price()?;
            let scaled_price = round.scaled_answer();

            let tokens = TokenAmount::from_base_units(tokens_for_usd_value(
                usd_value.base_units(),
                scaled_price,
            )?);
            // The tokens minted, not the requested figure, are the ground
            // truth of value moved
            let debit = UsdAmount::from_base_units(usd_value_of_tokens(
                tokens.base_units(),
                scaled_price,
            )?);

            // debit <= usd_value <= available, so this cannot underflow
            let new_credit = available.checked_sub(debit).ok_or(Error::Underflow {
                operation: "redeem credit".into(),
            })?;

            if !tokens.is_zero() {
                let engine_address = engine.address;
                engine.token.mint(engine_address, caller, tokens)?;
            }

            engine.credit.insert(caller, new_credit);

            tracing::info!(
                user = %caller.short(),
                requested = %usd_value,
                debited = %debit,
                tokens = %tokens,
                "credit redeemed for minted collateral"
            );

            engine.add_event(EngineEvent::CollateralRedeemed(CollateralRedeemedEvent {
                user: caller,
                token_amount: tokens,
            }));

            Ok(tokens)
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ SIDE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recorded USD credit of `user` (zero if never seen)
    pub fn credit_of(&self, user: &Address) -> UsdAmount {
        self.credit.get(user).copied().unwrap_or(UsdAmount::ZERO)
    }

    /// USD value of one whole collateral token, fixed-point scaled.
    ///
    /// Performs no validity check on the oracle answer: a zero or negative
    /// answer yields a zero value rather than an error.
    pub fn token_value(&self) -> Result<UsdAmount> {
        let round = self.read_price()?;
        Ok(UsdAmount::from_base_units(round.scaled_answer()))
    }

    /// The raw, unvalidated oracle price round
    pub fn full_token_value(&self) -> Result<PriceRound> {
        self.read_price()
    }

    /// Sum of all recorded USD credit (the engine's outstanding liability)
    pub fn total_outstanding_credit(&self) -> UsdAmount {
        let sum: u128 = self.credit.values().map(|c| c.base_units()).sum();
        UsdAmount::from_base_units(sum)
    }

    /// The engine's own ledger identity
    pub fn address(&self) -> Address {
        self.address
    }

    /// The collateral token's ledger identity
    pub fn collateral_token_address(&self) -> Address {
        self.token.address()
    }

    /// The price feed's ledger identity
    pub fn price_feed_address(&self) -> Address {
        self.feed.address()
    }

    /// Shared access to the collateral token (balances, allowances)
    pub fn token(&self) -> &CollateralToken {
        &self.token
    }

    /// Mutable access to the collateral token (approvals, pause switch)
    pub fn token_mut(&mut self) -> &mut CollateralToken {
        &mut self.token
    }

    /// Shared access to the injected price feed
    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Get recent events
    pub fn recent_events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Verify the steady-state invariant: the engine holds no collateral
    pub fn verify_zero_balance_invariant(&self) -> bool {
        self.token.balance_of(&self.address).is_zero()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SNAPSHOTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Serialize the engine's ledger state (the feed is not part of it)
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let state = EngineState {
            address: self.address,
            token: self.token.clone(),
            credit: self.credit.clone(),
        };
        bincode::serialize(&state).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Human-readable JSON rendering of the ledger state, for operator
    /// inspection and audit dumps
    pub fn snapshot_json(&self) -> Result<String> {
        let state = EngineState {
            address: self.address,
            token: self.token.clone(),
            credit: self.credit.clone(),
        };
        serde_json::to_string_pretty(&state).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Restore an engine from a snapshot, re-injecting the price feed
    pub fn restore(bytes: &[u8], feed: F) -> Result<Self> {
        let state: EngineState =
            bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))?;
        Self::new(state.address, state.token, feed).map(|mut engine| {
            engine.credit = state.credit;
            engine
        })
    }

    /// Compute state hash over the credit ledger and token state
    pub fn state_hash(&self) -> StateHash {
        let mut data = Vec::new();
        data.extend_from_slice(self.token.state_hash().as_bytes());

        let mut sorted: Vec<_> = self.credit.iter().collect();
        sorted.sort_by_key(|(k, _)| *k.as_bytes());
        for (addr, credit) in sorted {
            data.extend_from_slice(addr.as_bytes());
            data.extend_from_slice(&credit.base_units().to_be_bytes());
        }

        StateHash::sha256(&data)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run `f` under the reentrancy guard.
    ///
    /// The flag is checked-and-set at entry and cleared by a drop guard on
    /// every exit path: success, failure, and unwind alike.
    fn non_reentrant<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        struct Reset<'a, F: PriceFeed>(&'a mut StabilityEngine<F>);

        impl<F: PriceFeed> Drop for Reset<'_, F> {
            fn drop(&mut self) {
                self.0.entered = false;
            }
        }

        if self.entered {
            return Err(Error::ReentrantCall);
        }
        self.entered = true;

        let mut guard = Reset(self);
        f(&mut *guard.0)
    }

    /// One synchronous oracle read; never cached across operations
    fn read_price(&self) -> Result<PriceRound> {
        self.feed.latest_round_data()
    }

    /// Add an event (with pruning)
    fn add_event(&mut self, event: EngineEvent) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }
}
