//! # Elastic Pool Example
//!
//! Shows the pool growing on demand and draining gracefully, using an
//! in-memory "echo" transport in place of real child processes.
//!
//! The echo strategy comes up instantly; every payload sent to a worker is
//! echoed back as an inbound message.
//!
//! ## Run
//! ```bash
//! cargo run --example elastic
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use poolvisor::{
    Channel, ChannelError, ChannelEvent, EventKind, Message, PoolConfig, PoolManager,
    SpawnContext, SpawnError, SpawnOutcome, SpawnStrategy, StrategyRing,
};

/// Loopback transport: sends are acknowledged and echoed back inbound.
struct EchoChannel {
    inbound_tx: mpsc::UnboundedSender<ChannelEvent>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
    closed: CancellationToken,
}

impl EchoChannel {
    fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            closed: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl Channel for EchoChannel {
    async fn send(&self, message: Message) -> Result<(), ChannelError> {
        if self.closed.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        // Pretend the child did some work, then answered.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = self.inbound_tx.send(ChannelEvent::Message(message));
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

struct EchoStrategy;

#[async_trait]
impl SpawnStrategy for EchoStrategy {
    fn name(&self) -> &str {
        "echo"
    }

    async fn spawn(
        &self,
        _ctx: &SpawnContext,
        _options: &PoolConfig,
    ) -> Result<SpawnOutcome, SpawnError> {
        Ok(SpawnOutcome::Channel(Arc::new(EchoChannel::new())))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let ring = StrategyRing::new(vec![Arc::new(EchoStrategy)])?;
    let cfg = PoolConfig::default().with_sizes(1, 3);
    let pool = PoolManager::new(ring, SpawnContext::default(), cfg, Vec::new());
    let mut events = pool.subscribe();

    // Dispatch six jobs: hand each ready worker one unit of work, then ping
    // so the pool can grow while everyone is busy.
    let mut dispatched = 0usize;
    let mut pending = 6usize;
    let mut workers_seen = std::collections::HashSet::new();

    while pending > 0 {
        let Ok(ev) = events.recv().await else { break };
        match ev.kind {
            EventKind::WorkerReady => {
                if let Some(w) = &ev.worker {
                    workers_seen.insert(w.id());
                    if dispatched < 6 {
                        w.message(Message::new(format!("job {dispatched}")));
                        dispatched += 1;
                        pool.ping().await; // a worker just went busy
                    }
                }
            }
            EventKind::WorkerMessage => {
                if let Some(m) = &ev.message {
                    println!("echo: {:?}", m.downcast_ref::<String>().map(String::as_str));
                }
                pending -= 1;
            }
            _ => {}
        }
    }

    let info = pool.info().await;
    println!(
        "pool grew to {} worker(s): total={} busy={} idle={}",
        workers_seen.len(),
        info.total,
        info.busy,
        info.idle
    );

    // Broadcast one payload to every worker, busy or idle.
    pool.message(Message::new(String::from("flush caches"))).await;
    let mut flushes = pool.total().await;
    while flushes > 0 {
        if let Ok(ev) = events.recv().await {
            if ev.kind == EventKind::WorkerMessage {
                flushes -= 1;
            }
        }
    }

    pool.terminate().await?;
    println!("drained: total={}", pool.total().await);
    Ok(())
}
