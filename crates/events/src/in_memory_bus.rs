//! In-memory bus backed by unbounded tokio channels.

use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::bus::{EventBus, Subscription};
use crate::envelope::Envelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct Inner<M> {
    subscribers: Vec<mpsc::UnboundedSender<Envelope<M>>>,
    next_sequence: u64,
    latest: Option<Envelope<M>>,
}

/// In-memory pub/sub bus.
///
/// - No IO; publishing never awaits
/// - Fan-out to every live subscriber
/// - Optional latest-value replay: a replaying bus hands the most recent
///   message to each new subscriber, so late subscribers learn the current
///   state without waiting for the next change
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    inner: Mutex<Inner<M>>,
    replay_latest: bool,
}

impl<M> InMemoryEventBus<M> {
    /// Plain broadcast: subscribers only see messages published after they joined.
    pub fn new() -> Self {
        Self::with_replay(false)
    }

    /// Broadcast with latest-value replay.
    pub fn replaying() -> Self {
        Self::with_replay(true)
    }

    fn with_replay(replay_latest: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                subscribers: Vec::new(),
                next_sequence: 1,
                latest: None,
            }),
            replay_latest,
        }
    }

    /// Number of subscribers still attached as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.subscribers.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = BusError;

    fn publish(&self, message: M) -> Result<u64, Self::Error> {
        let mut inner = self.inner.lock().map_err(|_| BusError::Poisoned)?;

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        let envelope = Envelope::new(sequence, Utc::now(), message);

        // Drop any dead subscribers while publishing.
        inner.subscribers.retain(|tx| tx.send(envelope.clone()).is_ok());
        tracing::trace!(sequence, subscribers = inner.subscribers.len(), "published");

        if self.replay_latest {
            inner.latest = Some(envelope);
        }
        Ok(sequence)
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();

        // A poisoned lock still yields a subscription; it just stays silent.
        match self.inner.lock() {
            Ok(mut inner) => {
                if let Some(latest) = inner.latest.clone() {
                    let _ = tx.send(latest);
                }
                inner.subscribers.push(tx);
            }
            Err(_) => tracing::warn!("subscribe on poisoned event bus"),
        }

        Subscription::new(rx)
    }
}
