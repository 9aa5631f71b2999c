//! # Spawn strategy abstraction.
//!
//! A [`SpawnStrategy`] is one way of starting a worker process and
//! establishing its [`Channel`](crate::channel::Channel): fork a local
//! binary, connect to a pre-started helper, go through a container runtime —
//! the pool does not care. It only invokes the strategy and interprets the
//! [`SpawnOutcome`].
//!
//! A strategy is allowed to bound its own wait and signal
//! [`SpawnOutcome::TimedOut`]; the pool treats that as "try the same strategy
//! again", not as a failure. A hard failure is returned as
//! [`SpawnError`](crate::error::SpawnError) and abandons the attempt.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::channel::ChannelRef;
use crate::config::PoolConfig;
use crate::error::SpawnError;

/// Result of one strategy invocation.
pub enum SpawnOutcome {
    /// The worker process is up and its channel is ready.
    Channel(ChannelRef),
    /// The strategy's own wait expired; invoke it again.
    TimedOut,
}

/// Execution context handed to every strategy invocation.
///
/// Carries the pool's cancellation token so strategies can tie child
/// processes into application shutdown. The token is advisory: the pool
/// itself never cancels an in-flight spawn attempt, it relies on the
/// strategy's own timeout signal to bound the wait.
#[derive(Clone)]
pub struct SpawnContext {
    /// Cancellation token shared with the owning application.
    pub cancel: CancellationToken,
}

impl SpawnContext {
    /// Creates a context around the given token.
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

impl Default for SpawnContext {
    /// A context with a fresh, never-cancelled token.
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }
}

/// # One way of starting a worker process.
///
/// Implementations receive the [`SpawnContext`] and the pool's
/// [`PoolConfig`] — the latter unmodified, so a strategy may read
/// caller-supplied keys from [`PoolConfig::extra`].
///
/// ## Example
/// ```
/// use async_trait::async_trait;
/// use poolvisor::{PoolConfig, SpawnContext, SpawnError, SpawnOutcome, SpawnStrategy};
///
/// struct Stub;
///
/// #[async_trait]
/// impl SpawnStrategy for Stub {
///     fn name(&self) -> &str {
///         "stub"
///     }
///
///     async fn spawn(
///         &self,
///         _ctx: &SpawnContext,
///         options: &PoolConfig,
///     ) -> Result<SpawnOutcome, SpawnError> {
///         let _binary = options.extra("binary"); // strategy-defined key
///         Err(SpawnError::strategy("stub", "not a real transport"))
///     }
/// }
/// ```
#[async_trait]
pub trait SpawnStrategy: Send + Sync + 'static {
    /// Returns a stable, human-readable strategy name.
    fn name(&self) -> &str;

    /// Attempts to start one worker process and establish its channel.
    async fn spawn(
        &self,
        ctx: &SpawnContext,
        options: &PoolConfig,
    ) -> Result<SpawnOutcome, SpawnError>;
}

/// Shared handle to a [`SpawnStrategy`] implementation.
pub type StrategyRef = Arc<dyn SpawnStrategy>;
