//! Bankroll sizing, variance, and behavioral risk heuristics.

pub mod kelly;
pub mod tilt;
pub mod variance;
