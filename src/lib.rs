//! Library entrypoint for parlay-engine.
//!
//! Exposes all modules so integration tests can import them.

pub mod config;
pub mod extract;
pub mod hedge;
pub mod models;
pub mod odds;
pub mod parlay;
pub mod risk;
