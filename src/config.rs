//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the centralized settings for one pool instance.
//!
//! Config is used in two ways:
//! 1. **Pool creation**: `PoolManager::new(provider, ctx, config, subscribers)`
//! 2. **Spawn strategies**: the pool hands every strategy invocation a
//!    reference to the same config, unmodified, so strategies may read
//!    caller-supplied keys from [`PoolConfig::extra`].
//!
//! ## Invariants
//! `min_size <= max_size` is expected but **not** enforced here; violating it
//! is a configuration error upstream. With `min_size > max_size` the pool
//! honors `min_size` on catch-up and `max_size` on incremental growth.

use std::collections::HashMap;

/// Configuration for a [`PoolManager`](crate::pool::PoolManager).
///
/// Defines:
/// - **Scaling bounds**: minimum steady-state size and hard ceiling
/// - **Event system**: bus capacity for event delivery
/// - **Strategy pass-through**: free-form keys spawn strategies may read
///
/// ## Field semantics
/// - `min_size`: the pool spawns up to this many workers eagerly and tops the
///   pool back up to it on every `ping()`
/// - `max_size`: hard ceiling on committed + in-flight workers
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
/// - `extra`: opaque key/value pairs forwarded to strategies untouched
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Minimum steady-state pool size.
    ///
    /// `PoolManager::new` issues this many spawn attempts immediately, and
    /// `ping()` issues catch-up attempts whenever the committed capacity
    /// (running workers plus in-flight attempts) falls below it.
    pub min_size: usize,

    /// Hard ceiling on committed capacity.
    ///
    /// `ping()` never lets running workers plus in-flight attempts exceed
    /// this value.
    pub max_size: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip older items. Minimum value is 1 (enforced
    /// via [`PoolConfig::bus_capacity_clamped`]).
    pub bus_capacity: usize,

    /// Caller-supplied options passed through to spawn strategies unmodified.
    ///
    /// The pool never reads these; they exist so a strategy can be
    /// parameterized (binary path, handshake timeout, ...) without the pool
    /// knowing the keys.
    pub extra: HashMap<String, String>,
}

impl PoolConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a caller-supplied option by key, if present.
    #[inline]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Returns a new config with updated scaling bounds.
    pub fn with_sizes(mut self, min_size: usize, max_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Returns a new config with one extra key set.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `min_size = 0` (no eager spawns; the pool grows on demand)
    /// - `max_size = 4` (small, safe ceiling)
    /// - `bus_capacity = 1024` (good baseline)
    /// - `extra = {}` (nothing forwarded)
    fn default() -> Self {
        Self {
            min_size: 0,
            max_size: 4,
            bus_capacity: 1024,
            extra: HashMap::new(),
        }
    }
}
