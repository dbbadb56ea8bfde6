//! Live hedge-status classification and accuracy tracking.

pub mod classifier;
pub mod tracker;
