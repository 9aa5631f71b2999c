//! # Custom Subscriber Example
//!
//! Shows how to implement a custom event subscriber to track pool metrics,
//! alongside the built-in `LogWriter`.
//!
//! The example counts:
//! - Workers that came up
//! - Spawn retries
//! - Worker faults
//!
//! ## Run
//! ```bash
//! cargo run --example metrics --features logging
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use poolvisor::{
    Channel, ChannelError, ChannelEvent, Event, EventKind, LogWriter, Message, PoolConfig,
    PoolManager, SpawnContext, SpawnError, SpawnOutcome, SpawnStrategy, StrategyRing, Subscribe,
};

struct MetricsSubscriber {
    ready: AtomicU64,
    retries: AtomicU64,
    faults: AtomicU64,
}

impl MetricsSubscriber {
    fn new() -> Self {
        Self {
            ready: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        }
    }

    fn print_stats(&self) {
        println!();
        println!("Metrics:");
        println!(" ├─► Ready:   {}", self.ready.load(Ordering::Relaxed));
        println!(" ├─► Retries: {}", self.retries.load(Ordering::Relaxed));
        println!(" └─► Faults:  {}", self.faults.load(Ordering::Relaxed));
    }
}

#[async_trait]
impl Subscribe for MetricsSubscriber {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::WorkerReady => {
                self.ready.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::SpawnRetrying => {
                self.retries.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::WorkerError => {
                self.faults.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "metrics"
    }
}

/// Transport that acknowledges sends and stays quiet until closed.
struct QuietChannel {
    inbound_rx: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
    _inbound_tx: mpsc::UnboundedSender<ChannelEvent>,
    closed: CancellationToken,
}

impl QuietChannel {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inbound_rx: Mutex::new(rx),
            _inbound_tx: tx,
            closed: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl Channel for QuietChannel {
    async fn send(&self, _message: Message) -> Result<(), ChannelError> {
        if self.closed.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        Ok(())
    }

    async fn recv(&self) -> Option<ChannelEvent> {
        let mut rx = self.inbound_rx.lock().await;
        tokio::select! {
            _ = self.closed.cancelled() => None,
            ev = rx.recv() => ev,
        }
    }

    async fn close(&self) -> Result<(), ChannelError> {
        self.closed.cancel();
        Ok(())
    }
}

/// Times out on its first call, then comes up — exercising the retry path.
struct SlowStart {
    first: AtomicU64,
}

#[async_trait]
impl SpawnStrategy for SlowStart {
    fn name(&self) -> &str {
        "slow-start"
    }

    async fn spawn(
        &self,
        _ctx: &SpawnContext,
        _options: &PoolConfig,
    ) -> Result<SpawnOutcome, SpawnError> {
        if self.first.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(SpawnOutcome::TimedOut);
        }
        Ok(SpawnOutcome::Channel(Arc::new(QuietChannel::new())))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let metrics = Arc::new(MetricsSubscriber::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![
        Arc::clone(&metrics) as Arc<dyn Subscribe>,
        Arc::new(LogWriter::new()),
    ];

    let ring = StrategyRing::new(vec![Arc::new(SlowStart {
        first: AtomicU64::new(0),
    })])?;
    let pool = PoolManager::new(
        ring,
        SpawnContext::default(),
        PoolConfig::default().with_sizes(2, 2),
        subs,
    );

    let mut events = pool.subscribe();
    let mut up = 0;
    while up < 2 {
        if let Ok(ev) = events.recv().await {
            if ev.kind == EventKind::WorkerReady {
                up += 1;
            }
        }
    }

    pool.terminate().await?;
    // Give the fan-out workers a beat to drain their queues.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    metrics.print_stats();
    Ok(())
}
