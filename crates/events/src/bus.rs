//! Publish/subscribe abstraction (mechanics only).
//!
//! The bus distributes notifications from one producer (the Session Source)
//! to any number of consumers (the Session Gate, screens, diagnostics).
//!
//! ## Delivery
//!
//! - **Broadcast**: each subscription receives its own copy of every message
//!   published after it subscribed.
//! - **Ordered per bus**: messages arrive in publish order, stamped with a
//!   monotonically increasing sequence number.
//! - **Duplicates are possible**: a producer may republish an unchanged state
//!   (e.g. on credential refresh). Consumers must be idempotent.
//!
//! ## Unsubscribing
//!
//! Dropping a [`Subscription`] is the unsubscribe. The bus prunes dead
//! subscribers on the next publish, so a dropped subscription never receives
//! anything and never blocks the producer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::envelope::Envelope;

/// A subscription to a notification stream.
///
/// Designed for a single consumer task. Use [`Subscription::recv`] inside a
/// `tokio::select!` loop:
///
/// ```ignore
/// let mut sub = bus.subscribe();
/// loop {
///     tokio::select! {
///         _ = shutdown.notified() => break,
///         msg = sub.recv() => match msg {
///             Some(envelope) => handle(envelope.into_payload()),
///             None => break, // bus dropped
///         },
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: mpsc::UnboundedReceiver<Envelope<M>>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: mpsc::UnboundedReceiver<Envelope<M>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Envelope<M>> {
        self.receiver.recv().await
    }

    /// Take the next message without waiting.
    pub fn try_recv(&mut self) -> Result<Envelope<M>, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything currently queued.
    pub fn drain(&mut self) -> Vec<Envelope<M>> {
        let mut out = Vec::new();
        while let Ok(env) = self.receiver.try_recv() {
            out.push(env);
        }
        out
    }

    /// Explicit unsubscribe. Equivalent to dropping the subscription.
    pub fn unsubscribe(mut self) {
        self.receiver.close();
    }
}

/// Transport-agnostic pub/sub bus.
///
/// `publish` returns the sequence number assigned to the message.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<u64, Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<u64, Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
