//! # poolvisor
//!
//! **Poolvisor** is a lightweight elastic pool of worker processes for Rust.
//!
//! It decides when to spawn new workers, tracks their busy/idle state,
//! retries failed spawns, and tears the pool down gracefully — without ever
//! blocking the controlling task. The crate is designed as a building block
//! for request routers and job runners that farm work out to child
//! processes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │SpawnStrategy │   │SpawnStrategy │   │SpawnStrategy │
//!     │ (fork local) │   │ (helper bin) │   │    (...)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └───────────┬──────┴──────────────────┘
//!                        ▼
//!               ┌─────────────────┐  round-robin cursor
//!               │  StrategyRing   │  (owned by the provider)
//!               └────────┬────────┘
//!                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PoolManager                                                      │
//! │  - workers: registry of live Worker handles                       │
//! │  - starting: in-flight spawn attempts                             │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Worker    │   │    Worker    │   │    Worker    │
//!     │ (busy/idle)  │   │ (busy/idle)  │   │ (busy/idle)  │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Channel          │ Channel          │ Channel
//!      ▼                  ▼                  ▼
//!   child process      child process      child process
//! ```
//!
//! ### Scaling lifecycle
//! ```text
//! PoolManager::new(provider, ctx, config, subscribers)
//!   └─► min_size spawn attempts (fire-and-forget)
//!
//! ping()                       (the explicit re-evaluation trigger)
//!   ├─► below min_size  ─► issue exactly the missing attempts
//!   ├─► idle worker     ─► announce it (WorkerReady)
//!   ├─► below max_size  ─► issue one attempt
//!   └─► at capacity     ─► nothing; wait for worker events
//!
//! one spawn attempt:
//!   ├─► provider.current() / advance()          (rotation)
//!   ├─► strategy timeouts retried transparently (same strategy)
//!   ├─► Ok(channel) ─► Worker registered, wired, WorkerReady
//!   └─► hard failure ─► SpawnFailed, ping() re-evaluates
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------------|
//! | **Spawning**      | Pluggable process-start strategies with round-robin rotation.     | [`SpawnStrategy`], [`StrategyRing`]       |
//! | **Transport**     | Opaque bidirectional channel to each worker process.              | [`Channel`], [`Message`]                  |
//! | **Scaling**       | Min/max bounds, catch-up and incremental growth via `ping()`.     | [`PoolManager`], [`PoolConfig`]           |
//! | **Events**        | Ready/message/error/terminating surface with seq ordering.        | [`Event`], [`EventKind`], [`Bus`]         |
//! | **Subscriber API**| Hook into pool events (logging, metrics, custom subscribers).     | [`Subscribe`], [`SubscriberSet`]          |
//! | **Errors**        | Typed faults for channels, spawns, and the pool itself.           | [`ChannelError`], [`SpawnError`], [`PoolError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use poolvisor::{
//!     PoolConfig, PoolManager, SpawnContext, SpawnError, SpawnOutcome, SpawnStrategy,
//!     StrategyRing,
//! };
//!
//! struct LocalBinary;
//!
//! #[async_trait]
//! impl SpawnStrategy for LocalBinary {
//!     fn name(&self) -> &str { "local-binary" }
//!
//!     async fn spawn(
//!         &self,
//!         _ctx: &SpawnContext,
//!         options: &PoolConfig,
//!     ) -> Result<SpawnOutcome, SpawnError> {
//!         let _path = options.extra("binary").unwrap_or("worker");
//!         // start the process, perform the handshake, return the channel...
//!         Err(SpawnError::strategy("local-binary", "not wired up in this example"))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ring = StrategyRing::new(vec![Arc::new(LocalBinary)])?;
//!     let cfg = PoolConfig::default().with_sizes(1, 4);
//!     let pool = PoolManager::new(ring, SpawnContext::default(), cfg, Vec::new());
//!
//!     let mut events = pool.subscribe();
//!     pool.ping().await; // demand grew: maybe grow the pool
//!     let _ev = events.recv().await?;
//!
//!     pool.terminate().await?;
//!     Ok(())
//! }
//! ```

mod channel;
mod config;
mod error;
mod events;
mod pool;
mod spawn;
mod subscribers;
mod worker;

// ---- Public re-exports ----

pub use channel::{Channel, ChannelEvent, ChannelRef, Message};
pub use config::PoolConfig;
pub use error::{ChannelError, PoolError, SpawnError};
pub use events::{Bus, Event, EventKind};
pub use pool::{PoolInfo, PoolManager};
pub use spawn::{SpawnContext, SpawnOutcome, SpawnStrategy, StrategyRef, StrategyRing};
pub use subscribers::{Subscribe, SubscriberSet};
pub use worker::{Worker, WorkerEvent, WorkerId, WorkerRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
