//! # Event subscribers for the pool runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the [`PoolManager`](crate::pool::PoolManager) to deliver
//! runtime events without blocking the pool itself.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   PoolManager ── publish(Event) ──► Bus ──► subscriber listener
//!                                              │
//!                                              └──► SubscriberSet::emit(&Event)
//!                                                     ┌─────────┬─────────┐
//!                                                     ▼         ▼         ▼
//!                                                LogWriter   Metrics   Custom
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
