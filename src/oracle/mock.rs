//! Deterministic price feed test double.
//!
//! A substitutable `PriceFeed` whose rounds are set by hand, used to
//! reproduce the redemption-correctness properties without a live data
//! feed. Kept in the library (not behind `cfg(test)`) so downstream crates
//! and integration tests can drive scripted price scenarios.

use std::cell::Cell;

use crate::error::Result;
use crate::oracle::price_feed::{PriceFeed, PriceRound};
use crate::utils::address::Address;

/// A price feed that returns exactly what it was told to return.
#[derive(Debug)]
pub struct MockPriceFeed {
    address: Address,
    round: Cell<PriceRound>,
}

impl MockPriceFeed {
    /// Create a mock feed with an initial answer (8 decimals) at round 1
    pub fn new(initial_answer: i128) -> Self {
        Self {
            address: Address::from_seed(b"mock-price-feed"),
            round: Cell::new(PriceRound {
                round_id: 1,
                answer: initial_answer,
                started_at: 0,
                updated_at: 0,
                answered_in_round: 1,
            }),
        }
    }

    /// Set a new answer, advancing the round and timestamps
    pub fn set_answer(&self, answer: i128) {
        let prev = self.round.get();
        let round_id = prev.round_id + 1;
        self.round.set(PriceRound {
            round_id,
            answer,
            started_at: prev.updated_at + 1,
            updated_at: prev.updated_at + 1,
            answered_in_round: round_id,
        });
    }

    /// Overwrite the full round tuple (for staleness and edge-case scenarios)
    pub fn set_round(&self, round: PriceRound) {
        self.round.set(round);
    }

    /// The current answer
    pub fn answer(&self) -> i128 {
        self.round.get().answer
    }
}

impl PriceFeed for MockPriceFeed {
    fn address(&self) -> Address {
        self.address
    }

    fn latest_round_data(&self) -> Result<PriceRound> {
        Ok(self.round.get())
    }
}
