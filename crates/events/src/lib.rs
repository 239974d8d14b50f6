//! Notification pub/sub used between the Session Source and its consumers.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::Envelope;
pub use in_memory_bus::{BusError, InMemoryEventBus};
