//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [ready] worker=0
//! [message] worker=0
//! [error] worker=0 err="worker process ended unexpectedly: signal 9"
//! [terminating] worker=0
//! [spawn-retrying] strategy="local" attempt=2
//! [spawn-failed] strategy="local" err="binary not found"
//! [draining]
//! [drained]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::worker::WorkerRef;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn worker_id(worker: &Option<WorkerRef>) -> String {
    match worker {
        Some(w) => w.id().to_string(),
        None => "?".to_string(),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerReady => {
                println!("[ready] worker={}", worker_id(&e.worker));
            }
            EventKind::WorkerMessage => {
                println!("[message] worker={}", worker_id(&e.worker));
            }
            EventKind::WorkerError => {
                println!(
                    "[error] worker={} err={:?}",
                    worker_id(&e.worker),
                    e.error.as_ref().map(ToString::to_string)
                );
            }
            EventKind::WorkerTerminating => {
                println!("[terminating] worker={}", worker_id(&e.worker));
            }
            EventKind::SpawnRetrying => {
                println!(
                    "[spawn-retrying] strategy={:?} attempt={:?}",
                    e.strategy, e.attempt
                );
            }
            EventKind::SpawnFailed => {
                println!(
                    "[spawn-failed] strategy={:?} err={:?}",
                    e.strategy, e.reason
                );
            }
            EventKind::PoolDraining => {
                println!("[draining]");
            }
            EventKind::PoolDrained => {
                println!("[drained]");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] {:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] {:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
