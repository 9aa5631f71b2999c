//! # Runtime events emitted by the pool and its workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Worker events**: lifecycle of one registered worker (ready, message, error, terminating)
//! - **Spawn events**: progress of in-flight spawn attempts (retry, hard failure)
//! - **Pool events**: drain lifecycle and subscriber plumbing
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! worker handle, the inbound payload, and the strategy name.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events originating from a single worker are published in the
//! order the underlying channel produced them; there is no ordering guarantee
//! across different workers.
//!
//! ## Example
//! ```rust
//! use poolvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SpawnFailed)
//!     .with_strategy("local")
//!     .with_reason("binary not found");
//!
//! assert_eq!(ev.kind, EventKind::SpawnFailed);
//! assert_eq!(ev.strategy.as_deref(), Some("local"));
//! assert_eq!(ev.reason.as_deref(), Some("binary not found"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::channel::Message;
use crate::error::ChannelError;
use crate::worker::WorkerRef;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pool runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Worker lifecycle events ===
    /// A worker is idle and available for work.
    ///
    /// Published when a freshly spawned worker registers, when a worker
    /// finishes a unit of work, and when `ping()` re-announces an already
    /// idle worker to consumers waiting for capacity.
    ///
    /// Sets:
    /// - `worker`: the available worker handle
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerReady,

    /// An application message arrived from a worker's child process.
    ///
    /// Sets:
    /// - `worker`: the originating worker handle
    /// - `message`: the opaque payload (forwarded uninspected)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerMessage,

    /// A worker's channel reported a fault.
    ///
    /// When the fault is [`ChannelError::UnexpectedExit`] the pool has
    /// already told the worker to terminate and scheduled a capacity
    /// re-check; other faults are surfaced only.
    ///
    /// Sets:
    /// - `worker`: the faulting worker handle
    /// - `error`: the channel fault
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerError,

    /// A worker's channel is closing; the worker has left the registry.
    ///
    /// Sets:
    /// - `worker`: the departing worker handle
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerTerminating,

    // === Spawn attempt events ===
    /// A spawn strategy signalled a timeout and is being retried.
    ///
    /// The same strategy is invoked again; this is progress reporting, not a
    /// failure.
    ///
    /// Sets:
    /// - `strategy`: strategy name
    /// - `attempt`: retry number (1-based)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SpawnRetrying,

    /// A spawn attempt was abandoned after a hard strategy failure.
    ///
    /// Sets:
    /// - `strategy`: strategy name
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SpawnFailed,

    // === Pool lifecycle events ===
    /// Drain requested: every registered worker is being asked to terminate.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PoolDraining,

    /// Drain finished: all termination results are in and removals applied.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PoolDrained,

    // === Subscriber plumbing ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and drop reason
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,
}

/// Pool runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker handle, for worker lifecycle events.
    pub worker: Option<WorkerRef>,
    /// Inbound payload, for [`EventKind::WorkerMessage`].
    pub message: Option<Message>,
    /// Channel fault, for [`EventKind::WorkerError`].
    pub error: Option<ChannelError>,
    /// Spawn strategy name, for spawn attempt events.
    pub strategy: Option<Arc<str>>,
    /// Human-readable reason (spawn failures, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Retry count for [`EventKind::SpawnRetrying`] (1-based).
    pub attempt: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            message: None,
            error: None,
            strategy: None,
            reason: None,
            attempt: None,
        }
    }

    /// Attaches a worker handle.
    #[inline]
    pub fn with_worker(mut self, worker: WorkerRef) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches an inbound payload.
    #[inline]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Attaches a channel fault.
    #[inline]
    pub fn with_error(mut self, error: ChannelError) -> Self {
        self.error = Some(error);
        self
    }

    /// Attaches a spawn strategy name.
    #[inline]
    pub fn with_strategy(mut self, strategy: impl Into<Arc<str>>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a retry count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
