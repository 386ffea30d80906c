//! Utility modules: identity, constants, math, validation.

pub mod address;
pub mod constants;
pub mod math;
pub mod validation;
