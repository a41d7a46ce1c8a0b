//! InMemoryBroker - development broker with named queues.
//!
//! Deliveries are leased: `receive` removes the message and hands it out,
//! the lease puts it back (`requeue`) or moves it to the dead-letter list.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::ports::{Broker, Delivery, QueueConsumer, QueueError, QueuePublisher};

#[derive(Debug, Clone)]
struct StoredMessage {
    body: Vec<u8>,
    delivery_count: u32,
}

/// A message the consumer gave up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub body: Vec<u8>,
    pub delivery_count: u32,
    pub reason: String,
}

#[derive(Default)]
struct QueueSlot {
    ready: VecDeque<StoredMessage>,
    dead: Vec<DeadLetter>,
    notify: Arc<Notify>,
}

#[derive(Default)]
struct BrokerState {
    queues: HashMap<String, QueueSlot>,
}

impl BrokerState {
    fn slot_mut(&mut self, queue_name: &str) -> Result<&mut QueueSlot, QueueError> {
        self.queues
            .get_mut(queue_name)
            .ok_or_else(|| QueueError::UnknownQueue(queue_name.to_string()))
    }

    fn push(&mut self, queue_name: &str, message: StoredMessage) -> Result<(), QueueError> {
        let slot = self.slot_mut(queue_name)?;
        slot.ready.push_back(message);
        slot.notify.notify_one();
        Ok(())
    }
}

/// In-memory [`Broker`].
///
/// With `create_if_missing` unset, connecting to a queue that was never
/// declared fails with [`QueueError::UnknownQueue`].
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    create_if_missing: bool,
}

impl InMemoryBroker {
    pub fn new(create_if_missing: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState::default())),
            create_if_missing,
        }
    }

    /// Broker with `queue_names` already declared.
    pub async fn with_queues(queue_names: &[&str]) -> Self {
        let broker = Self::new(false);
        {
            let mut state = broker.state.lock().await;
            for name in queue_names {
                state.queues.entry((*name).to_string()).or_default();
            }
        }
        broker
    }

    /// Remove and return every ready message of `queue_name`.
    pub async fn drain(&self, queue_name: &str) -> Result<Vec<Vec<u8>>, QueueError> {
        let mut state = self.state.lock().await;
        let slot = state.slot_mut(queue_name)?;
        Ok(slot.ready.drain(..).map(|m| m.body).collect())
    }

    pub async fn ready_len(&self, queue_name: &str) -> Result<usize, QueueError> {
        let mut state = self.state.lock().await;
        Ok(state.slot_mut(queue_name)?.ready.len())
    }

    pub async fn dead_letters(&self, queue_name: &str) -> Result<Vec<DeadLetter>, QueueError> {
        let mut state = self.state.lock().await;
        Ok(state.slot_mut(queue_name)?.dead.clone())
    }

    async fn connect(&self, queue_name: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        if state.queues.contains_key(queue_name) {
            return Ok(());
        }
        if !self.create_if_missing {
            return Err(QueueError::UnknownQueue(queue_name.to_string()));
        }
        state.queues.insert(queue_name.to_string(), QueueSlot::default());
        Ok(())
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn declare(&self, queue_name: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.queues.entry(queue_name.to_string()).or_default();
        Ok(())
    }

    async fn publisher(&self, queue_name: &str) -> Result<Arc<dyn QueuePublisher>, QueueError> {
        self.connect(queue_name).await?;
        Ok(Arc::new(InMemoryPublisher {
            queue_name: queue_name.to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    async fn consumer(&self, queue_name: &str) -> Result<Arc<dyn QueueConsumer>, QueueError> {
        self.connect(queue_name).await?;
        Ok(Arc::new(InMemoryConsumer {
            queue_name: queue_name.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct InMemoryPublisher {
    queue_name: String,
    state: Arc<Mutex<BrokerState>>,
}

#[async_trait]
impl QueuePublisher for InMemoryPublisher {
    fn queue_name(&self) -> &str {
        &self.queue_name
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.push(
            &self.queue_name,
            StoredMessage {
                body: payload,
                delivery_count: 0,
            },
        )
    }
}

struct InMemoryConsumer {
    queue_name: String,
    state: Arc<Mutex<BrokerState>>,
}

#[async_trait]
impl QueueConsumer for InMemoryConsumer {
    fn queue_name(&self) -> &str {
        &self.queue_name
    }

    async fn receive(&self) -> Result<Box<dyn Delivery>, QueueError> {
        loop {
            // no await between pop_front and return: cancel-safe
            let notify = {
                let mut state = self.state.lock().await;
                let slot = state.slot_mut(&self.queue_name)?;
                if let Some(mut message) = slot.ready.pop_front() {
                    message.delivery_count += 1;
                    return Ok(Box::new(InMemoryDelivery {
                        queue_name: self.queue_name.clone(),
                        message,
                        state: Arc::clone(&self.state),
                    }));
                }
                Arc::clone(&slot.notify)
            };
            notify.notified().await;
        }
    }
}

struct InMemoryDelivery {
    queue_name: String,
    message: StoredMessage,
    state: Arc<Mutex<BrokerState>>,
}

#[async_trait]
impl Delivery for InMemoryDelivery {
    fn body(&self) -> &[u8] {
        &self.message.body
    }

    fn delivery_count(&self) -> u32 {
        self.message.delivery_count
    }

    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        Ok(())
    }

    async fn requeue(self: Box<Self>) -> Result<(), QueueError> {
        let InMemoryDelivery {
            queue_name,
            message,
            state,
        } = *self;
        let mut state = state.lock().await;
        state.push(&queue_name, message)
    }

    async fn dead_letter(self: Box<Self>, reason: String) -> Result<(), QueueError> {
        let InMemoryDelivery {
            queue_name,
            message,
            state,
        } = *self;
        let mut state = state.lock().await;
        state.slot_mut(&queue_name)?.dead.push(DeadLetter {
            body: message.body,
            delivery_count: message.delivery_count,
            reason,
        });
        Ok(())
    }
}
