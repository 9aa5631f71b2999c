//! Spawning: the strategy seam, the rotation provider, and the retry loop.
//!
//! ## Contents
//! - [`SpawnStrategy`], [`SpawnOutcome`], [`SpawnContext`] the external seam
//!   for starting worker processes
//! - [`StrategyRing`] round-robin provider owning the rotation cursor
//! - `retry::establish_channel` drives one attempt, retrying timeouts against
//!   the same strategy

mod rotation;
pub(crate) mod retry;
mod strategy;

pub use rotation::StrategyRing;
pub use strategy::{SpawnContext, SpawnOutcome, SpawnStrategy, StrategyRef};
