//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the pool manager, spawn
//! attempts, worker wiring and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PoolManager` (ping, drain, worker wiring),
//!   `spawn::retry::establish_channel` (retry progress), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: `PoolManager`'s subscriber listener (fans out to
//!   `SubscriberSet`) and direct receivers from `PoolManager::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
