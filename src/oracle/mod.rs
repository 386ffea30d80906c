//! Price oracle interface and test double.

pub mod mock;
pub mod price_feed;

pub use mock::MockPriceFeed;
pub use price_feed::{PriceFeed, PriceRound};
