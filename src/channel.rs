//! # Worker communication channel abstraction.
//!
//! This module defines the seam between the pool and whatever transport
//! actually talks to a child process: the [`Channel`] trait (bidirectional,
//! async, closable), the [`ChannelEvent`] inbound stream items, and the
//! opaque [`Message`] payload envelope.
//!
//! The pool never inspects payloads beyond forwarding them, and never
//! assumes anything about the wire encoding; a `Channel` implementation owns
//! both ends of that contract.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use poolvisor::{Channel, ChannelError, ChannelEvent, Message};
//!
//! struct NullChannel;
//!
//! #[async_trait]
//! impl Channel for NullChannel {
//!     async fn send(&self, _message: Message) -> Result<(), ChannelError> {
//!         Ok(())
//!     }
//!
//!     async fn recv(&self) -> Option<ChannelEvent> {
//!         None // stream ended: the peer is gone
//!     }
//!
//!     async fn close(&self) -> Result<(), ChannelError> {
//!         Ok(())
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Opaque application payload exchanged with a worker process.
///
/// The pool treats payloads as sealed envelopes: it clones and forwards them,
/// nothing more. Producers and consumers agree on the concrete type and
/// recover it with [`Message::downcast_ref`].
///
/// ## Example
/// ```
/// use poolvisor::Message;
///
/// let m = Message::new(String::from("render sector 7"));
/// assert_eq!(m.downcast_ref::<String>().map(String::as_str), Some("render sector 7"));
/// assert!(m.downcast_ref::<u64>().is_none());
/// ```
#[derive(Clone)]
pub struct Message {
    payload: Arc<dyn Any + Send + Sync>,
}

impl Message {
    /// Wraps a payload of any sendable type.
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self {
            payload: Arc::new(payload),
        }
    }

    /// Recovers the payload if it is of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Message(..)")
    }
}

/// One item of a channel's inbound stream.
#[derive(Debug)]
pub enum ChannelEvent {
    /// An application message arrived from the child process.
    Message(Message),
    /// The channel reported a fault (see [`ChannelError`] for kinds).
    Error(ChannelError),
}

/// # Bidirectional message transport to one running worker process.
///
/// A `Channel` is created by a spawn strategy, handed to exactly one
/// [`Worker`](crate::worker::Worker), and lives as long as that worker.
///
/// ### Contract
/// - [`send`](Channel::send) resolves when the unit of work carried by the
///   message has completed on the child (rpc-style), not merely when bytes
///   were written. The pool derives the worker's busy/idle state from it.
/// - [`recv`](Channel::recv) yields inbound events in the order the child
///   produced them and returns `None` once the channel is closed from either
///   side. It is only ever polled from one task.
/// - [`close`](Channel::close) asks the transport to shut down and resolves
///   when the close is acknowledged (or failed). After a successful close,
///   `recv` must eventually return `None`.
#[async_trait]
pub trait Channel: Send + Sync + 'static {
    /// Delivers a message to the child and resolves on completion.
    async fn send(&self, message: Message) -> Result<(), ChannelError>;

    /// Returns the next inbound event, or `None` once the channel is closed.
    async fn recv(&self) -> Option<ChannelEvent>;

    /// Closes the channel; resolves when the close is acknowledged.
    async fn close(&self) -> Result<(), ChannelError>;
}

/// Shared handle to a [`Channel`] implementation.
pub type ChannelRef = Arc<dyn Channel>;
