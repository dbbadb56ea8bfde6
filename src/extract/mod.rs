//! Slip-extraction orchestration: error types and the bounded-concurrency
//! task queue that feeds extracted legs into the engine.

pub mod errors;
pub mod queue;
