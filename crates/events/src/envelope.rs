use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope for a published message, stamped by the bus.
///
/// - `sequence` is monotonically increasing per bus, starting at 1.
/// - `emitted_at` is the wall-clock publish time (diagnostics only; ordering
///   uses `sequence`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<M> {
    sequence: u64,
    emitted_at: DateTime<Utc>,
    payload: M,
}

impl<M> Envelope<M> {
    pub fn new(sequence: u64, emitted_at: DateTime<Utc>, payload: M) -> Self {
        Self {
            sequence,
            emitted_at,
            payload,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }

    pub fn payload(&self) -> &M {
        &self.payload
    }

    pub fn into_payload(self) -> M {
        self.payload
    }
}
