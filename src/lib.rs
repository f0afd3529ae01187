#![cfg_attr(not(test), no_std)]

mod filter;
mod throttle;

pub use filter::{Filter, Passthrough};
pub use throttle::{Calibration, Config, State, Throttle};

/// Fixed-point sample type used throughout the crate (Q16.16).
///
/// All internal arithmetic uses the saturating operation family
/// (`saturating_mul` and friends), so an overflowing slope or offset pins to
/// the numeric limits instead of wrapping. Division only happens behind an
/// explicit zero-denominator guard in the calibration step.
pub type Q = fixed::types::I16F16;
