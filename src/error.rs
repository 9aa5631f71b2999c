//! Error types used by the pool runtime and worker channels.
//!
//! This module defines three error enums:
//!
//! - [`ChannelError`] — faults reported by a worker's communication channel.
//! - [`SpawnError`] — hard failures of a spawn strategy (never auto-retried).
//! - [`PoolError`] — errors raised by the pool orchestration itself.
//!
//! All types provide `as_label()` for logging/metrics, and [`ChannelError`]
//! additionally provides [`ChannelError::is_unexpected_exit`], the predicate
//! that decides whether a fault is recovered by replacing the worker.

use thiserror::Error;

/// # Faults reported by a worker's communication channel.
///
/// `UnexpectedExit` is the one kind the pool recovers from locally (the
/// worker is terminated and capacity re-evaluated); every other kind is
/// surfaced to subscribers and left to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    /// The child process behind the channel ended without being asked to.
    #[error("worker process ended unexpectedly: {reason}")]
    UnexpectedExit {
        /// Whatever detail the transport could recover (exit status, signal).
        reason: String,
    },

    /// The transport failed while the peer is presumed alive.
    #[error("channel transport fault: {reason}")]
    Transport {
        /// The underlying fault message.
        reason: String,
    },

    /// The channel is already closed; no further sends are possible.
    #[error("channel is closed")]
    Closed,
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use poolvisor::ChannelError;
    ///
    /// let err = ChannelError::Closed;
    /// assert_eq!(err.as_label(), "channel_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::UnexpectedExit { .. } => "channel_unexpected_exit",
            ChannelError::Transport { .. } => "channel_transport",
            ChannelError::Closed => "channel_closed",
        }
    }

    /// Indicates whether the fault means the child process died on its own.
    ///
    /// The pool reacts to this kind (and only this kind) by terminating the
    /// worker and re-evaluating capacity.
    ///
    /// # Example
    /// ```
    /// use poolvisor::ChannelError;
    ///
    /// let fatal = ChannelError::UnexpectedExit { reason: "signal 9".into() };
    /// assert!(fatal.is_unexpected_exit());
    ///
    /// let plain = ChannelError::Transport { reason: "pipe full".into() };
    /// assert!(!plain.is_unexpected_exit());
    /// ```
    pub fn is_unexpected_exit(&self) -> bool {
        matches!(self, ChannelError::UnexpectedExit { .. })
    }
}

/// # Hard failures of a spawn strategy.
///
/// A strategy signalling a timeout is *not* an error (the attempt is retried
/// against the same strategy); this type is reserved for failures that
/// abandon the attempt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The strategy failed to produce a channel.
    #[error("spawn strategy {strategy:?} failed: {reason}")]
    Strategy {
        /// Name of the failing strategy.
        strategy: String,
        /// The underlying failure message.
        reason: String,
    },
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::Strategy { .. } => "spawn_strategy_failed",
        }
    }

    /// Convenience constructor for the common case.
    pub fn strategy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SpawnError::Strategy {
            strategy: name.into(),
            reason: reason.into(),
        }
    }
}

/// # Errors produced by the pool orchestration itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    /// The provider was constructed with zero spawn strategies.
    #[error("no spawn strategies configured")]
    NoStrategies,

    /// Drain finished, but some workers failed to close cleanly.
    ///
    /// The drain still waited for every worker; `failures` collects each
    /// close fault in no particular order.
    #[error("pool drain finished with {} worker(s) failing to close", .failures.len())]
    Drain {
        /// Per-worker close faults.
        failures: Vec<ChannelError>,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::NoStrategies => "pool_no_strategies",
            PoolError::Drain { .. } => "pool_drain_failed",
        }
    }
}
