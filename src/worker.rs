//! # Worker: the pool's handle on one running process.
//!
//! A [`Worker`] wraps exactly one [`Channel`](crate::channel::Channel) for
//! its whole lifetime and owns the busy/idle flag derived from channel
//! activity: a send marks it busy, the send's completion marks it idle again.
//!
//! ## State machine
//! ```text
//! Idle ──(message sent)──► Busy ──(completion received)──► Idle
//!   │                        │
//!   └──────── terminate ─────┴──► Terminating (terminal)
//! ```
//! `Terminating` is reachable from either state and is terminal: the worker
//! fires [`WorkerEvent::Terminating`] exactly once and accepts no further
//! sends afterwards.
//!
//! ## Event flow
//! Worker events travel over an unbounded queue installed by the pool at
//! registration time — unbounded so the terminal event can never be dropped.
//! The inbound pump forwards channel events in the order the channel
//! produced them:
//! ```text
//! channel.recv() ──► Message(m) ──► WorkerEvent::Message(m)
//!                ──► Error(e)   ──► WorkerEvent::Error(e)
//!                ──► None       ──► WorkerEvent::Terminating (once)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::channel::{ChannelEvent, ChannelRef, Message};
use crate::error::ChannelError;

/// Identifier of one worker, unique within its pool.
pub type WorkerId = u64;

/// Shared handle to a [`Worker`].
pub type WorkerRef = Arc<Worker>;

/// Lifecycle events a worker reports to its pool.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A unit of work completed; the worker is idle again.
    Ready,
    /// An application message arrived from the child process.
    Message(Message),
    /// The channel reported a fault.
    Error(ChannelError),
    /// The channel is closing; drop this worker. Terminal, fired once.
    Terminating,
}

/// The pool's handle on one running worker process.
///
/// ### Responsibilities
/// - **Busy tracking**: flips the busy flag around each send's lifetime
/// - **Inbound pump**: forwards channel events to the pool, in channel order
/// - **Terminal event**: fires `Terminating` exactly once, whether the close
///   was requested locally or the peer went away
///
/// ### Rules
/// - The busy flag is mutated only by the worker itself.
/// - After `Terminating` has fired, `message` calls are ignored.
pub struct Worker {
    id: WorkerId,
    channel: ChannelRef,
    busy: AtomicBool,
    closing: AtomicBool,
    fired: AtomicBool,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

impl Worker {
    /// Wraps a channel and starts the inbound pump.
    ///
    /// Returns the worker handle and the receiving end of its event queue;
    /// the pool wires the receiver to its own behavior at registration.
    pub(crate) fn start(
        id: WorkerId,
        channel: ChannelRef,
    ) -> (WorkerRef, mpsc::UnboundedReceiver<WorkerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Arc::new(Self {
            id,
            channel,
            busy: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            events: tx,
        });
        Arc::clone(&worker).pump();
        (worker, rx)
    }

    /// Returns the worker's pool-unique id.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Returns `true` while a unit of work is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Returns `true` once termination has begun; such a worker is neither
    /// idle nor busy and accepts no further sends.
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Forwards a message to the channel and tracks the busy window.
    ///
    /// Marks the worker busy immediately; the send completes in the
    /// background, after which the worker reports [`WorkerEvent::Ready`] (or
    /// [`WorkerEvent::Error`] if the send failed) and is idle again. Ignored
    /// once the worker is closing.
    pub fn message(self: &Arc<Self>, message: Message) {
        if self.is_closing() {
            return;
        }
        self.busy.store(true, Ordering::SeqCst);

        let worker = Arc::clone(self);
        tokio::spawn(async move {
            let res = worker.channel.send(message).await;
            worker.busy.store(false, Ordering::SeqCst);
            match res {
                Ok(()) => {
                    let _ = worker.events.send(WorkerEvent::Ready);
                }
                Err(e) => {
                    let _ = worker.events.send(WorkerEvent::Error(e));
                }
            }
        });
    }

    /// Asks the channel to close.
    ///
    /// The first call fires [`WorkerEvent::Terminating`] and drives the
    /// close; later calls are no-ops resolving immediately. The close
    /// result is returned so a draining pool can collect partial failures.
    pub async fn terminate(&self) -> Result<(), ChannelError> {
        if self.closing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.fire_terminating();
        self.channel.close().await
    }

    /// Forwards inbound channel events until the stream ends.
    fn pump(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                match self.channel.recv().await {
                    Some(ChannelEvent::Message(m)) => {
                        let _ = self.events.send(WorkerEvent::Message(m));
                    }
                    Some(ChannelEvent::Error(e)) => {
                        let _ = self.events.send(WorkerEvent::Error(e));
                    }
                    None => {
                        self.closing.store(true, Ordering::SeqCst);
                        self.fire_terminating();
                        break;
                    }
                }
            }
        });
    }

    fn fire_terminating(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            let _ = self.events.send(WorkerEvent::Terminating);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    use crate::channel::Channel;

    /// In-memory channel: records sends, exposes an injectable inbound side.
    struct TestChannel {
        sent: StdMutex<Vec<Message>>,
        inbound: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
        closed: CancellationToken,
        fail_sends: AtomicBool,
        close_result: Result<(), ChannelError>,
    }

    impl TestChannel {
        fn pair() -> (Arc<Self>, mpsc::UnboundedSender<ChannelEvent>) {
            Self::with_close(Ok(()))
        }

        fn with_close(
            close_result: Result<(), ChannelError>,
        ) -> (Arc<Self>, mpsc::UnboundedSender<ChannelEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                Arc::new(Self {
                    sent: StdMutex::new(Vec::new()),
                    inbound: Mutex::new(rx),
                    closed: CancellationToken::new(),
                    fail_sends: AtomicBool::new(false),
                    close_result,
                }),
                tx,
            )
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Channel for TestChannel {
        async fn send(&self, message: Message) -> Result<(), ChannelError> {
            if self.closed.is_cancelled() {
                return Err(ChannelError::Closed);
            }
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(ChannelError::Transport {
                    reason: "pipe full".into(),
                });
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
            self.close_result.clone()
        }
    }

    async fn expect_event(
        rx: &mut mpsc::UnboundedReceiver<WorkerEvent>,
    ) -> WorkerEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event within deadline")
            .expect("queue open")
    }

    #[tokio::test]
    async fn test_message_marks_busy_then_idle_with_ready() {
        let (channel, _tx) = TestChannel::pair();
        let (worker, mut rx) = Worker::start(1, channel.clone());

        assert!(!worker.is_busy());
        worker.message(Message::new("job"));
        assert!(worker.is_busy(), "busy must be set before the send completes");

        match expect_event(&mut rx).await {
            WorkerEvent::Ready => {}
            other => panic!("expected Ready, got {other:?}"),
        }
        assert!(!worker.is_busy());
        assert_eq!(channel.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_inbound_messages_forwarded_in_order() {
        let (channel, tx) = TestChannel::pair();
        let (_worker, mut rx) = Worker::start(1, channel);

        tx.send(ChannelEvent::Message(Message::new(1u32))).unwrap();
        tx.send(ChannelEvent::Message(Message::new(2u32))).unwrap();

        for expected in [1u32, 2u32] {
            match expect_event(&mut rx).await {
                WorkerEvent::Message(m) => {
                    assert_eq!(m.downcast_ref::<u32>(), Some(&expected));
                }
                other => panic!("expected Message, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_terminate_fires_terminating_once() {
        let (channel, _tx) = TestChannel::pair();
        let (worker, mut rx) = Worker::start(1, channel);

        worker.terminate().await.unwrap();
        worker.terminate().await.unwrap(); // idempotent

        match expect_event(&mut rx).await {
            WorkerEvent::Terminating => {}
            other => panic!("expected Terminating, got {other:?}"),
        }
        // The pump observes the closed channel too; no second terminal event.
        tokio::task::yield_now().await;
        assert!(
            tokio::time::timeout(Duration::from_millis(50), rx.recv())
                .await
                .is_err(),
            "terminal event must fire exactly once"
        );
    }

    #[tokio::test]
    async fn test_peer_close_fires_terminating() {
        let (channel, tx) = TestChannel::pair();
        let (worker, mut rx) = Worker::start(1, channel);

        drop(tx); // peer goes away

        match expect_event(&mut rx).await {
            WorkerEvent::Terminating => {}
            other => panic!("expected Terminating, got {other:?}"),
        }
        assert!(worker.is_closing());
    }

    #[tokio::test]
    async fn test_message_ignored_after_terminate() {
        let (channel, _tx) = TestChannel::pair();
        let (worker, _rx) = Worker::start(1, channel.clone());

        worker.terminate().await.unwrap();
        worker.message(Message::new("late"));
        tokio::task::yield_now().await;

        assert_eq!(channel.sent_count(), 0);
        assert!(!worker.is_busy());
    }

    #[tokio::test]
    async fn test_failed_send_reports_error_and_goes_idle() {
        let (channel, _tx) = TestChannel::pair();
        let (worker, mut rx) = Worker::start(1, channel.clone());
        channel.fail_sends.store(true, Ordering::SeqCst);

        worker.message(Message::new("doomed"));

        match expect_event(&mut rx).await {
            WorkerEvent::Error(e) => assert_eq!(e.as_label(), "channel_transport"),
            other => panic!("expected Error, got {other:?}"),
        }
        assert!(!worker.is_busy());
        assert_eq!(channel.sent_count(), 0);
    }
}
