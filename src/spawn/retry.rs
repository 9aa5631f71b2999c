//! # Establish a channel through one strategy, retrying its timeouts.
//!
//! This helper drives a single spawn attempt to a terminal state, publishing
//! retry progress to the [`Bus`].
//!
//! ```text
//!   strategy.spawn(ctx, options)
//!          │
//!          ├─ Channel(ch)  ──► done
//!          ├─ TimedOut     ──► publish SpawnRetrying, same strategy again
//!          └─ Err(e)       ──► abandoned (caller handles the failure path)
//! ```
//!
//! A timeout is the strategy saying "not yet", and is retried transparently
//! against the *same* strategy; rotation to the next strategy only happens
//! when a whole attempt is re-issued after a hard failure. The retry is an
//! explicit loop, so a long run of timeouts cannot grow the stack.

use crate::channel::ChannelRef;
use crate::config::PoolConfig;
use crate::error::SpawnError;
use crate::events::{Bus, Event, EventKind};
use crate::spawn::strategy::{SpawnContext, SpawnOutcome, SpawnStrategy};

/// Invokes `strategy` until it yields a channel or fails hard.
///
/// Publishes [`EventKind::SpawnRetrying`] with a 1-based retry count each
/// time the strategy signals a timeout.
pub(crate) async fn establish_channel(
    strategy: &dyn SpawnStrategy,
    ctx: &SpawnContext,
    options: &PoolConfig,
    bus: &Bus,
) -> Result<ChannelRef, SpawnError> {
    let mut retries: u32 = 0;

    loop {
        match strategy.spawn(ctx, options).await? {
            SpawnOutcome::Channel(channel) => return Ok(channel),
            SpawnOutcome::TimedOut => {
                retries = retries.saturating_add(1);
                bus.publish(
                    Event::new(EventKind::SpawnRetrying)
                        .with_strategy(strategy.name())
                        .with_attempt(retries),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::collections::VecDeque;

    use crate::channel::{Channel, ChannelEvent, Message};
    use crate::error::ChannelError;

    struct NullChannel;

    #[async_trait]
    impl Channel for NullChannel {
        async fn send(&self, _message: Message) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn recv(&self) -> Option<ChannelEvent> {
            None
        }

        async fn close(&self) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    enum Step {
        Up,
        Timeout,
        Fail,
    }

    struct Scripted {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpawnStrategy for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn spawn(
            &self,
            _ctx: &SpawnContext,
            _options: &PoolConfig,
        ) -> Result<SpawnOutcome, SpawnError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Up) | None => Ok(SpawnOutcome::Channel(Arc::new(NullChannel))),
                Some(Step::Timeout) => Ok(SpawnOutcome::TimedOut),
                Some(Step::Fail) => Err(SpawnError::strategy("scripted", "refused")),
            }
        }
    }

    #[tokio::test]
    async fn test_immediate_success_no_retry() {
        let strategy = Scripted::new(vec![Step::Up]);
        let bus = Bus::new(16);
        let res = establish_channel(
            &strategy,
            &SpawnContext::default(),
            &PoolConfig::default(),
            &bus,
        )
        .await;
        assert!(res.is_ok());
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_retries_same_strategy() {
        let strategy = Scripted::new(vec![Step::Timeout, Step::Timeout, Step::Up]);
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let res = establish_channel(
            &strategy,
            &SpawnContext::default(),
            &PoolConfig::default(),
            &bus,
        )
        .await;
        assert!(res.is_ok());
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 3);

        let first = rx.recv().await.expect("retry event");
        assert_eq!(first.kind, EventKind::SpawnRetrying);
        assert_eq!(first.attempt, Some(1));
        let second = rx.recv().await.expect("retry event");
        assert_eq!(second.attempt, Some(2));
    }

    #[tokio::test]
    async fn test_hard_failure_not_retried() {
        let strategy = Scripted::new(vec![Step::Fail, Step::Up]);
        let bus = Bus::new(16);
        let res = establish_channel(
            &strategy,
            &SpawnContext::default(),
            &PoolConfig::default(),
            &bus,
        )
        .await;
        assert!(res.is_err());
        assert_eq!(
            strategy.calls.load(Ordering::SeqCst),
            1,
            "a hard failure must abandon the attempt"
        );
    }
}
