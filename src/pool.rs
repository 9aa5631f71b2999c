//! # PoolManager: elastic worker-process pool.
//!
//! The [`PoolManager`] owns the worker registry, the in-flight spawn
//! bookkeeping, the event bus, and a [`SubscriberSet`] for fan-out. It
//! decides when to spawn, replaces workers whose process died, broadcasts
//! application messages, and drains the pool on request.
//!
//! ## Scaling policy
//! `ping()` is the single re-evaluation trigger. Each call performs at most
//! one corrective action, evaluated in order:
//! ```text
//! ping()
//!  ├─► workers + starting < min_size ─► issue exactly the missing attempts
//!  ├─► some registered worker idle   ─► re-announce it (WorkerReady)
//!  ├─► workers + starting < max_size ─► issue one attempt
//!  └─► at capacity, all busy         ─► nothing (wait for events)
//! ```
//! The policy always reasons over `workers + starting`, never over the
//! registry alone, so outstanding attempts are never double-committed.
//!
//! ## Spawn attempt lifecycle
//! ```text
//! spawn()                         (starting += 1, synchronous)
//!   └─► provider.current(), provider.advance()      (round-robin)
//!        └─► establish_channel()                    (timeouts retried, same strategy)
//!              ├─ Ok(channel) ─► register Worker ─► wire events ─► WorkerReady
//!              │                                    (starting -= 1)
//!              └─ Err(hard)   ─► starting -= 1 ─► SpawnFailed ─► ping()
//! ```
//!
//! ## Worker wiring
//! Installed once per worker at registration; one listener task per worker,
//! ending at the worker's terminal event:
//! - `Ready`        → republished as `WorkerReady`
//! - `Message(m)`   → republished as `WorkerMessage`
//! - `Error(e)`     → if the child died unexpectedly, the worker is told to
//!   terminate and, once its removal has been applied, `ping()` restores
//!   capacity; every fault is republished as `WorkerError` exactly once
//! - `Terminating`  → the worker leaves the registry (first matching id)
//!
//! ## Rules
//! - `starting` is decremented exactly once per attempt, before any capacity
//!   re-evaluation on the failure path.
//! - Worker events are handled in the order the worker produced them; there
//!   is no cross-worker ordering.
//! - A strategy set that fails persistently keeps `ping()` re-issuing
//!   attempts; strategies are expected to pace themselves (their own
//!   timeouts bound each attempt).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinSet;

use crate::channel::Message;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::events::{Bus, Event, EventKind};
use crate::spawn::retry::establish_channel;
use crate::spawn::{SpawnContext, StrategyRing};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::worker::{Worker, WorkerEvent, WorkerId, WorkerRef};

/// Point-in-time pool occupancy, from one registry scan.
///
/// `busy + idle == total` always; in-flight spawn attempts are not included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolInfo {
    /// Registered, running workers.
    pub total: usize,
    /// Workers with an outstanding unit of work.
    pub busy: usize,
    /// Workers available for work.
    pub idle: usize,
}

/// Coordinates worker spawning, lifecycle events, message broadcast, and
/// graceful drain for one elastic pool of worker processes.
pub struct PoolManager {
    cfg: PoolConfig,
    ctx: SpawnContext,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    provider: Mutex<StrategyRing>,
    workers: RwLock<Vec<WorkerRef>>,
    starting: AtomicUsize,
    listeners: Mutex<JoinSet<()>>,
    next_worker_id: AtomicU64,
}

impl PoolManager {
    /// Creates a pool and immediately issues `cfg.min_size` spawn attempts.
    ///
    /// The attempts are fire-and-forget; this constructor never blocks. Must
    /// be called within a Tokio runtime (listener tasks are spawned here).
    pub fn new(
        provider: StrategyRing,
        ctx: SpawnContext,
        cfg: PoolConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        let pool = Arc::new(Self {
            cfg,
            ctx,
            bus,
            subs,
            provider: Mutex::new(provider),
            workers: RwLock::new(Vec::new()),
            starting: AtomicUsize::new(0),
            listeners: Mutex::new(JoinSet::new()),
            next_worker_id: AtomicU64::new(0),
        });

        pool.subscriber_listener();
        for _ in 0..pool.cfg.min_size {
            pool.spawn();
        }
        pool
    }

    /// Re-evaluates pool capacity; call after anything that may have changed
    /// utilization (a worker got busy, one failed, demand grew).
    ///
    /// Safe to call repeatedly; each call performs at most one corrective
    /// action (see the module docs for the policy order).
    pub async fn ping(self: &Arc<Self>) {
        let (count, idle) = {
            let workers = self.workers.read().await;
            let idle = workers
                .iter()
                .find(|w| !w.is_busy() && !w.is_closing())
                .cloned();
            (workers.len(), idle)
        };
        let committed = count + self.starting.load(Ordering::SeqCst);

        if committed < self.cfg.min_size {
            for _ in committed..self.cfg.min_size {
                self.spawn();
            }
            return;
        }

        if let Some(worker) = idle {
            self.bus
                .publish(Event::new(EventKind::WorkerReady).with_worker(worker));
            return;
        }

        if committed < self.cfg.max_size {
            self.spawn();
        }
    }

    /// Broadcasts a message to every registered worker, busy or idle.
    ///
    /// Each channel send is independent; there is no acknowledgment and no
    /// ordering guarantee across workers.
    pub async fn message(&self, message: Message) {
        let workers = self.workers.read().await;
        for worker in workers.iter() {
            worker.message(message.clone());
        }
    }

    /// Asks every registered worker to terminate and waits for all of them.
    ///
    /// Waits for every close to resolve — collecting partial failures into
    /// [`PoolError::Drain`] rather than stopping at the first — and then for
    /// every worker's removal to be applied, so the registry is empty when
    /// this returns. Resolves immediately for an empty pool. There is no
    /// timeout: a channel that never acknowledges its close holds the drain
    /// open.
    pub async fn terminate(&self) -> Result<(), PoolError> {
        self.bus.publish(Event::new(EventKind::PoolDraining));

        let snapshot: Vec<WorkerRef> = self.workers.read().await.iter().cloned().collect();
        let results = join_all(snapshot.iter().map(|w| w.terminate())).await;
        let failures: Vec<_> = results.into_iter().filter_map(Result::err).collect();

        // Each worker's listener applies its own removal; drain them so the
        // registry reflects the terminations before reporting.
        {
            let mut listeners = self.listeners.lock().await;
            while listeners.join_next().await.is_some() {}
        }

        self.bus.publish(Event::new(EventKind::PoolDrained));
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PoolError::Drain { failures })
        }
    }

    /// Returns the number of registered, running workers.
    ///
    /// In-flight spawn attempts are excluded; see [`PoolManager::starting`].
    pub async fn total(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Returns the number of spawn attempts currently in flight.
    pub fn starting(&self) -> usize {
        self.starting.load(Ordering::SeqCst)
    }

    /// Returns occupancy counters from one registry scan.
    pub async fn info(&self) -> PoolInfo {
        let workers = self.workers.read().await;
        let total = workers.len();
        let busy = workers.iter().filter(|w| w.is_busy()).count();
        PoolInfo {
            total,
            busy,
            idle: total - busy,
        }
    }

    /// Subscribes directly to the pool's event bus.
    ///
    /// Subscribe before triggering the activity you want to observe; a
    /// broadcast receiver only sees events published after it was created.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Issues one fire-and-forget spawn attempt.
    ///
    /// `starting` is incremented here, synchronously, so a caller issuing a
    /// batch observes the attempts as committed capacity immediately.
    fn spawn(self: &Arc<Self>) {
        self.starting.fetch_add(1, Ordering::SeqCst);
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            pool.spawn_worker().await;
        });
    }

    /// Drives one spawn attempt to its terminal state.
    async fn spawn_worker(self: Arc<Self>) {
        let strategy = {
            let mut provider = self.provider.lock().await;
            let strategy = provider.current();
            provider.advance();
            strategy
        };

        match establish_channel(strategy.as_ref(), &self.ctx, &self.cfg, &self.bus).await {
            Ok(channel) => {
                let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
                let (worker, events) = Worker::start(id, channel);
                self.workers.write().await.push(Arc::clone(&worker));
                self.wire(Arc::clone(&worker), events).await;
                self.bus
                    .publish(Event::new(EventKind::WorkerReady).with_worker(worker));
                self.starting.fetch_sub(1, Ordering::SeqCst);
            }
            Err(e) => {
                // The attempt is dead; settle the books before re-evaluating,
                // or the capacity sum would still count it.
                self.starting.fetch_sub(1, Ordering::SeqCst);
                self.bus.publish(
                    Event::new(EventKind::SpawnFailed)
                        .with_strategy(strategy.name())
                        .with_reason(e.to_string()),
                );
                self.ping().await;
            }
        }
    }

    /// Installs the per-worker listener translating worker events into pool
    /// behavior. One task per worker; it ends at the terminal event.
    async fn wire(
        self: &Arc<Self>,
        worker: WorkerRef,
        mut events: tokio::sync::mpsc::UnboundedReceiver<WorkerEvent>,
    ) {
        let pool = Arc::clone(self);
        self.listeners.lock().await.spawn(async move {
            let mut replace = false;
            while let Some(ev) = events.recv().await {
                match ev {
                    WorkerEvent::Ready => {
                        pool.bus.publish(
                            Event::new(EventKind::WorkerReady).with_worker(Arc::clone(&worker)),
                        );
                    }
                    WorkerEvent::Message(message) => {
                        pool.bus.publish(
                            Event::new(EventKind::WorkerMessage)
                                .with_worker(Arc::clone(&worker))
                                .with_message(message),
                        );
                    }
                    WorkerEvent::Error(error) => {
                        if error.is_unexpected_exit() {
                            // The close queues the worker's terminal event;
                            // the replacement ping runs once the removal has
                            // been applied below.
                            let _ = worker.terminate().await;
                            replace = true;
                        }
                        pool.bus.publish(
                            Event::new(EventKind::WorkerError)
                                .with_worker(Arc::clone(&worker))
                                .with_error(error),
                        );
                    }
                    WorkerEvent::Terminating => {
                        pool.remove(worker.id()).await;
                        pool.bus.publish(
                            Event::new(EventKind::WorkerTerminating)
                                .with_worker(Arc::clone(&worker)),
                        );
                        if replace {
                            pool.ping().await;
                        }
                        break;
                    }
                }
            }
        });
    }

    /// Removes one worker from the registry; later entries keep their order.
    async fn remove(&self, id: WorkerId) {
        self.workers.write().await.retain(|w| w.id() != id);
    }

    /// Forwards bus events to the subscriber fan-out (fire-and-forget).
    fn subscriber_listener(self: &Arc<Self>) {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::{mpsc, watch, Semaphore};
    use tokio_util::sync::CancellationToken;

    use crate::channel::{Channel, ChannelEvent, ChannelRef};
    use crate::error::{ChannelError, SpawnError};
    use crate::spawn::{SpawnOutcome, SpawnStrategy, StrategyRef};

    // --- in-memory transport -------------------------------------------------

    struct TestChannel {
        sent: StdMutex<Vec<Message>>,
        inbound: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
        closed: CancellationToken,
        hold: watch::Sender<bool>,
        close_result: StdMutex<Result<(), ChannelError>>,
    }

    /// Test-side grip on one spawned channel.
    struct TestHandle {
        channel: Arc<TestChannel>,
        inject: mpsc::UnboundedSender<ChannelEvent>,
    }

    impl TestHandle {
        /// Simulates the peer side going away: the inbound stream ends.
        fn closed_by_peer(&self) {
            self.channel.closed.cancel();
        }
    }

    impl TestChannel {
        fn pair() -> (Arc<Self>, mpsc::UnboundedSender<ChannelEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let (hold, _) = watch::channel(false);
            (
                Arc::new(Self {
                    sent: StdMutex::new(Vec::new()),
                    inbound: Mutex::new(rx),
                    closed: CancellationToken::new(),
                    hold,
                    close_result: StdMutex::new(Ok(())),
                }),
                tx,
            )
        }

        fn hold_sends(&self, v: bool) {
            self.hold.send_replace(v);
        }

        fn set_close_err(&self, e: ChannelError) {
            *self.close_result.lock().unwrap() = Err(e);
        }

        fn sent(&self) -> Vec<Message> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Channel for TestChannel {
        async fn send(&self, message: Message) -> Result<(), ChannelError> {
            let mut gate = self.hold.subscribe();
            while *gate.borrow() {
                if gate.changed().await.is_err() {
                    break;
                }
            }
            if self.closed.is_cancelled() {
                return Err(ChannelError::Closed);
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&self) -> Option<ChannelEvent> {
            let mut rx = self.inbound.lock().await;
            tokio::select! {
                _ = self.closed.cancelled() => None,
                ev = rx.recv() => ev,
            }
        }

        async fn close(&self) -> Result<(), ChannelError> {
            self.closed.cancel();
            self.close_result.lock().unwrap().clone()
        }
    }

    // --- scripted strategy ---------------------------------------------------

    enum Step {
        Up,
        Timeout,
        Fail,
        /// Waits for one `release()` permit, then comes up.
        Hold,
    }

    struct Scripted {
        name: &'static str,
        steps: StdMutex<VecDeque<Step>>,
        gate: Arc<Semaphore>,
        handles: StdMutex<Vec<Arc<TestHandle>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                name,
                steps: StdMutex::new(steps.into()),
                gate: Arc::new(Semaphore::new(0)),
                handles: StdMutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn release(&self) {
            self.gate.add_permits(1);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn handle(&self, i: usize) -> Arc<TestHandle> {
            Arc::clone(&self.handles.lock().unwrap()[i])
        }

        fn come_up(&self) -> SpawnOutcome {
            let (channel, inject) = TestChannel::pair();
            self.handles
                .lock()
                .unwrap()
                .push(Arc::new(TestHandle {
                    channel: Arc::clone(&channel),
                    inject,
                }));
            SpawnOutcome::Channel(channel as ChannelRef)
        }
    }

    #[async_trait]
    impl SpawnStrategy for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn spawn(
            &self,
            _ctx: &SpawnContext,
            _options: &PoolConfig,
        ) -> Result<SpawnOutcome, SpawnError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Up) | None => Ok(self.come_up()),
                Some(Step::Timeout) => Ok(SpawnOutcome::TimedOut),
                Some(Step::Fail) => Err(SpawnError::strategy(self.name, "refused")),
                Some(Step::Hold) => {
                    self.gate.acquire().await.expect("gate open").forget();
                    Ok(self.come_up())
                }
            }
        }
    }

    // --- helpers -------------------------------------------------------------

    fn pool_with(
        strategies: Vec<StrategyRef>,
        min_size: usize,
        max_size: usize,
    ) -> Arc<PoolManager> {
        let ring = StrategyRing::new(strategies).expect("non-empty ring");
        let cfg = PoolConfig::default().with_sizes(min_size, max_size);
        PoolManager::new(ring, SpawnContext::default(), cfg, Vec::new())
    }

    async fn settle(pool: &Arc<PoolManager>, want_total: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if pool.total().await == want_total && pool.starting() == 0 {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "pool did not settle at total={want_total}"
            );
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    async fn next_of_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        let deadline = Duration::from_secs(2);
        loop {
            let ev = tokio::time::timeout(deadline, rx.recv())
                .await
                .expect("event within deadline")
                .expect("bus open");
            if ev.kind == kind {
                return ev;
            }
        }
    }

    // --- scenarios -----------------------------------------------------------

    #[tokio::test]
    async fn test_on_demand_growth_single_attempt() {
        let strategy = Scripted::new("local", vec![Step::Hold]);
        let pool = pool_with(vec![strategy.clone()], 0, 2);

        // min_size = 0: construction spawns nothing.
        tokio::task::yield_now().await;
        assert_eq!(strategy.calls(), 0);
        assert_eq!(pool.starting(), 0);
        assert_eq!(pool.total().await, 0);

        pool.ping().await;
        assert_eq!(pool.starting(), 1, "one attempt in flight");
        assert_eq!(pool.total().await, 0);

        strategy.release();
        settle(&pool, 1).await;
        assert_eq!(
            pool.info().await,
            PoolInfo {
                total: 1,
                busy: 0,
                idle: 1
            }
        );
    }

    #[tokio::test]
    async fn test_min_size_catchup_is_exact() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 2, 2);

        settle(&pool, 2).await;
        assert_eq!(strategy.calls(), 2, "exactly min_size attempts, not one more");

        // At capacity with an idle worker: ping surfaces readiness, no spawn.
        let mut rx = pool.subscribe();
        pool.ping().await;
        let ev = next_of_kind(&mut rx, EventKind::WorkerReady).await;
        assert!(ev.worker.is_some());
        assert_eq!(strategy.calls(), 2);
        assert_eq!(pool.starting(), 0);
    }

    #[tokio::test]
    async fn test_timeout_retried_before_success() {
        let strategy = Scripted::new("local", vec![Step::Timeout, Step::Hold]);
        let pool = pool_with(vec![strategy.clone()], 0, 1);
        let mut rx = pool.subscribe();

        pool.ping().await;
        let retry = next_of_kind(&mut rx, EventKind::SpawnRetrying).await;
        assert_eq!(retry.attempt, Some(1));
        assert_eq!(retry.strategy.as_deref(), Some("local"));

        // Still the same attempt: in flight through the retry.
        assert_eq!(pool.starting(), 1);
        assert_eq!(pool.total().await, 0);

        strategy.release();
        settle(&pool, 1).await;
        assert_eq!(strategy.calls(), 2, "retried against the same strategy");
    }

    #[tokio::test]
    async fn test_unexpected_exit_replaces_worker() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 1, 1);
        settle(&pool, 1).await;

        let mut rx = pool.subscribe();
        strategy
            .handle(0)
            .inject
            .send(ChannelEvent::Error(ChannelError::UnexpectedExit {
                reason: "signal 9".into(),
            }))
            .expect("worker pump alive");

        let err = next_of_kind(&mut rx, EventKind::WorkerError).await;
        assert!(err.error.as_ref().is_some_and(ChannelError::is_unexpected_exit));
        next_of_kind(&mut rx, EventKind::WorkerTerminating).await;

        // The replacement comes up through the automatic ping.
        settle(&pool, 1).await;
        assert_eq!(strategy.calls(), 2);

        // Exactly one error notification for the fault.
        let mut errors = 0;
        while let Ok(Ok(ev)) =
            tokio::time::timeout(Duration::from_millis(50), rx.recv()).await
        {
            if ev.kind == EventKind::WorkerError {
                errors += 1;
            }
        }
        assert_eq!(errors, 0, "no further error events after the fault");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_workers_regardless_of_busy() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 3, 3);
        let mut rx = pool.subscribe();
        settle(&pool, 3).await;

        // Make one worker busy: stall every channel's sends, hand one worker
        // a unit of work, then check the occupancy split.
        for i in 0..3 {
            strategy.handle(i).channel.hold_sends(true);
        }
        let ready = next_of_kind(&mut rx, EventKind::WorkerReady).await;
        let busy_worker = ready.worker.expect("ready carries the worker");
        busy_worker.message(Message::new("job"));
        assert_eq!(
            pool.info().await,
            PoolInfo {
                total: 3,
                busy: 1,
                idle: 2
            }
        );

        pool.message(Message::new("broadcast")).await;
        for i in 0..3 {
            strategy.handle(i).channel.hold_sends(false);
        }

        // Every channel eventually records the broadcast payload.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        'outer: for i in 0..3 {
            loop {
                let got = strategy.handle(i).channel.sent().iter().any(|m| {
                    m.downcast_ref::<&str>().is_some_and(|s| *s == "broadcast")
                });
                if got {
                    continue 'outer;
                }
                assert!(
                    tokio::time::Instant::now() < deadline,
                    "channel {i} never saw the broadcast"
                );
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }
    }

    #[tokio::test]
    async fn test_capacity_never_exceeds_max() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 0, 2);

        for _ in 0..5 {
            pool.ping().await;
            assert!(pool.total().await + pool.starting() <= 2);
        }
        settle(&pool, 2).await;

        for _ in 0..3 {
            pool.ping().await;
        }
        settle(&pool, 2).await;
        assert_eq!(strategy.calls(), 2, "pings at capacity must not spawn");
    }

    #[tokio::test]
    async fn test_failed_strategy_rotates_to_next() {
        let flaky = Scripted::new("flaky", vec![Step::Fail]);
        let solid = Scripted::new("solid", Vec::new());
        let pool = pool_with(vec![flaky.clone(), solid.clone()], 0, 1);
        let mut rx = pool.subscribe();

        pool.ping().await;
        let failed = next_of_kind(&mut rx, EventKind::SpawnFailed).await;
        assert_eq!(failed.strategy.as_deref(), Some("flaky"));

        settle(&pool, 1).await;
        assert_eq!(flaky.calls(), 1);
        assert_eq!(solid.calls(), 1, "retry went to the next strategy in rotation");
    }

    #[tokio::test]
    async fn test_terminate_drains_every_worker() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 3, 3);
        let mut rx = pool.subscribe();
        settle(&pool, 3).await;

        pool.terminate().await.expect("clean drain");
        assert_eq!(pool.total().await, 0);
        assert_eq!(
            pool.info().await,
            PoolInfo {
                total: 0,
                busy: 0,
                idle: 0
            }
        );

        next_of_kind(&mut rx, EventKind::PoolDraining).await;
        next_of_kind(&mut rx, EventKind::PoolDrained).await;
    }

    #[tokio::test]
    async fn test_terminate_empty_pool_resolves_immediately() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy], 0, 4);
        pool.terminate().await.expect("nothing to drain");
        assert_eq!(pool.total().await, 0);
    }

    #[tokio::test]
    async fn test_terminate_collects_partial_failures() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 2, 2);
        settle(&pool, 2).await;

        strategy
            .handle(0)
            .channel
            .set_close_err(ChannelError::Transport {
                reason: "stuck pipe".into(),
            });

        match pool.terminate().await {
            Err(PoolError::Drain { failures }) => assert_eq!(failures.len(), 1),
            other => panic!("expected Drain error, got {other:?}"),
        }
        // The failing worker still left the registry.
        assert_eq!(pool.total().await, 0);
    }

    #[tokio::test]
    async fn test_terminated_worker_never_reappears() {
        let strategy = Scripted::new("local", Vec::new());
        let pool = pool_with(vec![strategy.clone()], 1, 1);
        let mut rx = pool.subscribe();
        settle(&pool, 1).await;

        strategy.handle(0).closed_by_peer();
        next_of_kind(&mut rx, EventKind::WorkerTerminating).await;

        assert_eq!(pool.total().await, 0);
        pool.message(Message::new("orphan")).await;
        tokio::task::yield_now().await;
        assert!(strategy.handle(0).channel.sent().is_empty());
    }
}
