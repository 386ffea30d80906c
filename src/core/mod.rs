//! Core engine and collateral token.

pub mod engine;
pub mod events;
pub mod token;

pub use engine::{StabilityEngine, UsdAmount};
pub use events::EngineEvent;
pub use token::{CollateralToken, TokenAmount};
