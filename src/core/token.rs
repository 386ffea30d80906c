//! Collateral token implementation.
//!
//! This module implements the volatile collateral asset as a fungible
//! balance ledger whose supply-changing operations are restricted to a
//! single authorized controller (the stability engine):
//! - Minting and burning (controller-only)
//! - Balance and allowance tracking
//! - Transfer operations used by the engine's deposit pull
//! - Pause switch held by the token's own owner
//!
//! The controller restriction is a capability check: an explicit authorized
//! address set once after construction and compared on every privileged
//! call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::address::{Address, StateHash};
use crate::utils::constants::*;
use crate::utils::validation::{validate_address, validate_non_zero};

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed collateral amount in base units (prevents mixing token
/// units and USD units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from base units
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Create from whole tokens (scales up by the token decimals)
    pub const fn from_whole(tokens: u128) -> Self {
        Self(tokens * TOKEN_BASE_UNIT)
    }

    /// Get raw base-unit value
    pub fn base_units(&self) -> u128 {
        self.0
    }

    /// Get value in whole tokens (truncated)
    pub fn whole(&self) -> u128 {
        self.0 / TOKEN_BASE_UNIT
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

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:018}", self.0 / TOKEN_BASE_UNIT, self.0 % TOKEN_BASE_UNIT)
    }
}

impl From<u128> for TokenAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<TokenAmount> for u128 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Type of token operation for event logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenOperation {
    /// Minting new tokens
    Mint,
    /// Burning tokens
    Burn,
    /// Transfer between accounts
    Transfer,
}

/// Record of a token operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Type of operation
    pub operation: TokenOperation,
    /// Sender (None for mint)
    pub from: Option<Address>,
    /// Recipient (None for burn)
    pub to: Option<Address>,
    /// Amount in base units
    pub amount: TokenAmount,
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// The volatile collateral token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// The token's own ledger identity
    address: Address,
    /// Owner (holds the pause switch)
    owner: Address,
    /// Sole authorized caller of mint/burn, set once
    controller: Option<Address>,
    /// Pause state for supply-changing operations
    paused: bool,
    /// Total supply in base units
    total_supply: TokenAmount,
    /// Balances by address
    balances: HashMap<Address, TokenAmount>,
    /// Allowances by (owner, spender)
    allowances: HashMap<(Address, Address), TokenAmount>,
    /// Recent events (for client-side tracking)
    events: Vec<TokenEvent>,
    /// Maximum events to keep in memory
    max_events: usize,
}

impl CollateralToken {
    /// Create a new collateral token owned by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            decimals: TOKEN_DECIMALS,
            address: Address::from_seed(b"collateral-token"),
            owner,
            controller: None,
            paused: false,
            total_supply: TokenAmount::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            events: Vec::new(),
            max_events: MAX_EVENT_LOG,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROLLER CAPABILITY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Bind the controller capability, once.
    ///
    /// Only the owner may bind, and rebinding fails.
    pub fn set_controller(&mut self, caller: Address, controller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(Error::Unauthorized("only the owner may set the controller".into()));
        }
        validate_address(&controller)?;
        if self.controller.is_some() {
            return Err(Error::Unauthorized("controller is already set".into()));
        }
        self.controller = Some(controller);
        Ok(())
    }

    /// The bound controller, if any
    pub fn controller(&self) -> Option<Address> {
        self.controller
    }

    fn require_controller(&self, caller: Address) -> Result<()> {
        match self.controller {
            Some(c) if c == caller => Ok(()),
            _ => Err(Error::Unauthorized("only the controller may mint or burn".into())),
        }
    }

    fn require_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(Error::TokenPaused);
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUPPLY MANAGEMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Mint new tokens to `to` (controller-only)
    pub fn mint(&mut self, caller: Address, to: Address, amount: TokenAmount) -> Result<()> {
        self.require_controller(caller)?;
        self.require_not_paused()?;
        validate_address(&to)?;
        validate_non_zero(amount.base_units())?;

        let new_supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "mint total supply".into(),
        })?;
        let new_balance = self.balance_of(&to).checked_add(amount).ok_or(Error::Overflow {
            operation: "mint balance".into(),
        })?;

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;

        tracing::debug!(to = %to.short(), amount = %amount, "minted collateral");

        self.add_event(TokenEvent {
            operation: TokenOperation::Mint,
            from: None,
            to: Some(to),
            amount,
        });

        Ok(())
    }

    /// Burn tokens from the controller's own balance (controller-only)
    pub fn burn(&mut self, caller: Address, amount: TokenAmount) -> Result<()> {
        self.require_controller(caller)?;
        self.require_not_paused()?;
        validate_non_zero(amount.base_units())?;

        let current_balance = self.balance_of(&caller);
        if current_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.base_units(),
                available: current_balance.base_units(),
            });
        }

        let new_balance = current_balance.saturating_sub(amount);
        if new_balance.is_zero() {
            self.balances.remove(&caller);
        } else {
            self.balances.insert(caller, new_balance);
        }
        self.total_supply = self.total_supply.saturating_sub(amount);

        tracing::debug!(amount = %amount, "burned collateral");

        self.add_event(TokenEvent {
            operation: TokenOperation::Burn,
            from: Some(caller),
            to: None,
            amount,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSFERS AND ALLOWANCES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transfer tokens from the caller to `to`
    pub fn transfer(&mut self, caller: Address, to: Address, amount: TokenAmount) -> Result<()> {
        self.require_not_paused()?;
        validate_address(&to)?;
        validate_non_zero(amount.base_units())?;
        self.move_balance(caller, to, amount)
    }

    /// Approve `spender` to move up to `amount` of the caller's tokens
    pub fn approve(&mut self, caller: Address, spender: Address, amount: TokenAmount) -> Result<()> {
        validate_address(&spender)?;
        self.allowances.insert((caller, spender), amount);
        Ok(())
    }

    /// Transfer tokens on behalf of `from`, consuming the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<()> {
        self.require_not_paused()?;
        validate_address(&to)?;
        validate_non_zero(amount.base_units())?;

        let approved = self.allowance(&from, &caller);
        if approved < amount {
            return Err(Error::InsufficientAllowance {
                required: amount.base_units(),
                approved: approved.base_units(),
            });
        }

        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, caller), approved.saturating_sub(amount));
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: TokenAmount) -> Result<()> {
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount.base_units(),
                available: from_balance.base_units(),
            });
        }

        // A self-transfer moves no balance but is subject to the same
        // balance check and is recorded like any other transfer
        if from != to {
            let new_from = from_balance.saturating_sub(amount);
            if new_from.is_zero() {
                self.balances.remove(&from);
            } else {
                self.balances.insert(from, new_from);
            }

            let new_to = self.balance_of(&to).checked_add(amount).ok_or(Error::Overflow {
                operation: "transfer balance".into(),
            })?;
            self.balances.insert(to, new_to);
        }

        self.add_event(TokenEvent {
            operation: TokenOperation::Transfer,
            from: Some(from),
            to: Some(to),
            amount,
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PAUSE SWITCH
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pause supply-changing operations (owner-only)
    pub fn pause(&mut self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(Error::Unauthorized("only the owner may pause".into()));
        }
        self.paused = true;
        tracing::info!("collateral token paused");
        Ok(())
    }

    /// Resume supply-changing operations (owner-only)
    pub fn unpause(&mut self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(Error::Unauthorized("only the owner may unpause".into()));
        }
        self.paused = false;
        tracing::info!("collateral token unpaused");
        Ok(())
    }

    /// Whether supply-changing operations are paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// The token's own ledger identity
    pub fn address(&self) -> Address {
        self.address
    }

    /// The owner address
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Get total supply
    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Get balance of an address
    pub fn balance_of(&self, holder: &Address) -> TokenAmount {
        self.balances.get(holder).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Get remaining allowance of (owner, spender)
    pub fn allowance(&self, holder: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*holder, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Get number of token holders
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u128 = self.balances.values().map(|b| b.base_units()).sum();
        sum == self.total_supply.base_units()
    }

    /// Get recent events
    pub fn recent_events(&self) -> &[TokenEvent] {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add an event (with pruning)
    fn add_event(&mut self, event: TokenEvent) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Compute state hash over the essential state (supply + balances)
    pub fn state_hash(&self) -> StateHash {
        let mut data = Vec::new();
        data.extend_from_slice(&self.total_supply.base_units().to_be_bytes());

        // Sort balances for deterministic hashing
        let mut sorted_balances: Vec<_> = self.balances.iter().collect();
        sorted_balances.sort_by_key(|(k, _)| *k.as_bytes());

        for (addr, balance) in sorted_balances {
            data.extend_from_slice(addr.as_bytes());
            data.extend_from_slice(&balance.base_units().to_be_bytes());
        }

        StateHash::sha256(&data)
    }
}
