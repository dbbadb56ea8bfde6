//! Parlay probability, payout, and commentary.

pub mod highlights;
pub mod simulator;
