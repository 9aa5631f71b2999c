//! # Cyclic spawn strategy provider.
//!
//! [`StrategyRing`] owns the set of configured strategies and the rotation
//! cursor. The pool only ever asks for [`current`](StrategyRing::current) and
//! then [`advance`](StrategyRing::advance)s; it never reaches into the cursor
//! itself, so the round-robin policy lives in exactly one place.

use crate::error::PoolError;
use crate::spawn::strategy::StrategyRef;

/// Round-robin provider over one or more spawn strategies.
///
/// The cursor wraps to the start when it runs off the end; with a single
/// strategy every `advance` is a wrap.
pub struct StrategyRing {
    entries: Vec<StrategyRef>,
    cursor: usize,
}

impl StrategyRing {
    /// Creates a ring over the given strategies.
    ///
    /// Returns [`PoolError::NoStrategies`] for an empty set — a pool without
    /// a way to spawn workers is a configuration error.
    pub fn new(entries: Vec<StrategyRef>) -> Result<Self, PoolError> {
        if entries.is_empty() {
            return Err(PoolError::NoStrategies);
        }
        Ok(Self { entries, cursor: 0 })
    }

    /// Returns the strategy under the cursor.
    pub fn current(&self) -> StrategyRef {
        self.entries[self.cursor].clone()
    }

    /// Moves the cursor to the next strategy.
    ///
    /// Returns `true` when the cursor wrapped back to the start.
    pub fn advance(&mut self) -> bool {
        self.cursor += 1;
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
            return true;
        }
        false
    }

    /// Returns the number of configured strategies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: an empty ring cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::error::{PoolError, SpawnError};
    use crate::spawn::strategy::{SpawnContext, SpawnOutcome, SpawnStrategy};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Named(&'static str);

    #[async_trait]
    impl SpawnStrategy for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn spawn(
            &self,
            _ctx: &SpawnContext,
            _options: &PoolConfig,
        ) -> Result<SpawnOutcome, SpawnError> {
            Err(SpawnError::strategy(self.0, "test stub"))
        }
    }

    fn ring(names: &[&'static str]) -> StrategyRing {
        let entries: Vec<StrategyRef> = names
            .iter()
            .copied()
            .map(|n| Arc::new(Named(n)) as StrategyRef)
            .collect();
        match StrategyRing::new(entries) {
            Ok(r) => r,
            Err(_) => panic!("non-empty ring must construct"),
        }
    }

    #[test]
    fn test_empty_ring_rejected() {
        assert!(matches!(
            StrategyRing::new(Vec::new()),
            Err(PoolError::NoStrategies)
        ));
    }

    #[test]
    fn test_rotation_order_and_wrap() {
        let mut r = ring(&["a", "b", "c"]);
        assert_eq!(r.current().name(), "a");
        assert!(!r.advance());
        assert_eq!(r.current().name(), "b");
        assert!(!r.advance());
        assert_eq!(r.current().name(), "c");
        assert!(r.advance(), "running off the end must wrap");
        assert_eq!(r.current().name(), "a");
    }

    #[test]
    fn test_single_strategy_always_wraps() {
        let mut r = ring(&["only"]);
        for _ in 0..5 {
            assert_eq!(r.current().name(), "only");
            assert!(r.advance());
        }
    }

    #[test]
    fn test_len() {
        assert_eq!(ring(&["a", "b"]).len(), 2);
    }
}
