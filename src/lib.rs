//! # Stablecredit
//!
//! A collateral-to-value accounting engine: users surrender a
//! volatile-priced collateral asset and receive credit denominated in a
//! stable unit of account; later they redeem that credit for a freshly
//! issued amount of the collateral asset, computed from the then-current
//! oracle price so the USD value handed back equals the USD value
//! originally deposited, modulo integer-unit rounding.
//!
//! ## Architecture
//!
//! Three collaborating components, leaves first:
//!
//! - **Oracle**: an injected [`oracle::PriceFeed`] capability reporting the
//!   collateral unit price at 8 decimals; trusted as-is, never re-validated
//!   by the core
//! - **Collateral token**: a fungible ledger whose mint/burn operations are
//!   restricted to a single bound controller
//! - **Stability engine**: burns on deposit, mints on redemption, and keeps
//!   the per-user USD credit ledger exactly synchronized with both
//!
//! ## Design Principles
//!
//! - **Integer-exact**: a single 10^18 fixed-point precision, multiply
//!   before divide, truncation always against the redeemer
//! - **All-or-nothing**: every operation fails fast before any state change
//!   or completes atomically
//! - **Capability-checked**: mint/burn authority is an explicit address
//!   comparison, not a type hierarchy
//!
//! ## Example
//!
//! ```rust
//! use stablecredit::prelude::*;
//!
//! let owner = Address::from_seed(b"owner");
//! let user = Address::from_seed(b"user");
//! let engine_address = Address::from_seed(b"engine");
//!
//! let mut token = CollateralToken::new(owner);
//! token.set_controller(owner, engine_address).unwrap();
//! token.mint(engine_address, user, TokenAmount::from_whole(10)).unwrap();
//!
//! let feed = MockPriceFeed::new(100_000_000); // $1.00 at 8 decimals
//! let mut engine = StabilityEngine::new(engine_address, token, feed).unwrap();
//!
//! engine.token_mut().approve(user, engine_address, TokenAmount::from_whole(10)).unwrap();
//! let credit = engine.deposit_collateral(user, TokenAmount::from_whole(10)).unwrap();
//! assert_eq!(credit, UsdAmount::from_dollars(10));
//!
//! let minted = engine.redeem_collateral(user, credit).unwrap();
//! assert_eq!(minted, TokenAmount::from_whole(10));
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod oracle;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        engine::{StabilityEngine, UsdAmount},
        events::EngineEvent,
        token::{CollateralToken, TokenAmount},
    };
    pub use crate::error::{Error, Result};
    pub use crate::oracle::{
        mock::MockPriceFeed,
        price_feed::{PriceFeed, PriceRound},
    };
    pub use crate::utils::address::Address;
}

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "stablecredit";
