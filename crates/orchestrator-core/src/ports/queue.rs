//! Queue port - publish/consume over a message broker.
//!
//! Payloads are opaque bytes here; encoding is agreed between stages
//! (see [`crate::domain::WireMessage`]).
//!
//! Connecting to a queue is modelled as asking the [`Broker`] for a
//! publisher or a consumer bound to that queue name.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue {0} is not declared")]
    UnknownQueue(String),

    #[error("queue {0} is closed")]
    Closed(String),

    #[error("broker operation failed: {0}")]
    OperationFailed(String),
}

/// Connection to a broker. Implementations must be safe to share.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Declare `queue_name` (no-op when it already exists).
    async fn declare(&self, queue_name: &str) -> Result<(), QueueError>;

    async fn publisher(&self, queue_name: &str) -> Result<Arc<dyn QueuePublisher>, QueueError>;

    async fn consumer(&self, queue_name: &str) -> Result<Arc<dyn QueueConsumer>, QueueError>;
}

#[async_trait]
pub trait QueuePublisher: Send + Sync {
    fn queue_name(&self) -> &str;

    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError>;
}

#[async_trait]
pub trait QueueConsumer: Send + Sync {
    fn queue_name(&self) -> &str;

    /// Wait for the next delivery.
    ///
    /// Must be cancel-safe: dropping the future before it resolves loses no
    /// message.
    async fn receive(&self) -> Result<Box<dyn Delivery>, QueueError>;
}

/// One leased message. The holder must settle it exactly once.
#[async_trait]
pub trait Delivery: Send + Sync {
    fn body(&self) -> &[u8];

    /// How many times this message has been handed out, this one included.
    fn delivery_count(&self) -> u32;

    async fn ack(self: Box<Self>) -> Result<(), QueueError>;

    /// Put the message back for another attempt.
    async fn requeue(self: Box<Self>) -> Result<(), QueueError>;

    /// Give up on the message.
    async fn dead_letter(self: Box<Self>, reason: String) -> Result<(), QueueError>;
}
