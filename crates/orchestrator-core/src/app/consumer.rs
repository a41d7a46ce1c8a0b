//! ConsumerGroup - worker tasks draining the inbound queues.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::controller::{Controller, Inbound};
use crate::error::OrchestratorError;
use crate::ports::{Delivery, QueueConsumer};

/// What to do with a delivery whose handling failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Deliveries of one message (first one included) before giving up on
    /// retryable failures.
    pub max_delivery_count: u32,
}

/// Settlement chosen for one handled delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Ack,
    Requeue,
    DeadLetter,
}

impl DeliveryPolicy {
    pub fn settle(&self, result: &Result<(), OrchestratorError>, delivery_count: u32) -> Settlement {
        match result {
            Ok(()) => Settlement::Ack,
            Err(err) if err.is_retryable() && delivery_count < self.max_delivery_count => {
                Settlement::Requeue
            }
            Err(_) => Settlement::DeadLetter,
        }
    }
}

/// Handle to the spawned consumer tasks.
/// - `request_shutdown` stops them taking new deliveries
/// - `shutdown_and_join` also waits for in-flight handling to finish
pub struct ConsumerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl ConsumerGroup {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            joins: Vec::new(),
        }
    }

    /// Spawn `workers` tasks on `consumer`, routing deliveries as `inbound`.
    pub fn spawn(
        &mut self,
        workers: usize,
        consumer: Arc<dyn QueueConsumer>,
        controller: Arc<Controller>,
        inbound: Inbound,
        policy: DeliveryPolicy,
    ) {
        for worker_id in 0..workers {
            let consumer = Arc::clone(&consumer);
            let controller = Arc::clone(&controller);
            let shutdown_rx = self.shutdown_tx.subscribe();

            self.joins.push(tokio::spawn(async move {
                consume_loop(worker_id, consumer, controller, inbound, policy, shutdown_rx).await;
            }));
        }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(err) = join.await {
                error!(error = %err, "consumer task ended abnormally");
            }
        }
    }
}

impl Default for ConsumerGroup {
    fn default() -> Self {
        Self::new()
    }
}

async fn consume_loop(
    worker_id: usize,
    consumer: Arc<dyn QueueConsumer>,
    controller: Arc<Controller>,
    inbound: Inbound,
    policy: DeliveryPolicy,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let queue = consumer.queue_name().to_string();
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // receive() is cancel-safe, so racing it against shutdown loses nothing
        let received = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            received = consumer.receive() => received,
        };

        let delivery = match received {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(worker_id, queue = %queue, error = %err, "receive failed, consumer stopping");
                break;
            }
        };

        let result = controller.handle(inbound, delivery.body()).await;
        settle(worker_id, &queue, delivery, &result, policy).await;
    }
    debug!(worker_id, queue = %queue, "consumer stopped");
}

async fn settle(
    worker_id: usize,
    queue: &str,
    delivery: Box<dyn Delivery>,
    result: &Result<(), OrchestratorError>,
    policy: DeliveryPolicy,
) {
    let delivery_count = delivery.delivery_count();
    let settled = match policy.settle(result, delivery_count) {
        Settlement::Ack => delivery.ack().await,
        Settlement::Requeue => {
            warn!(worker_id, queue, delivery_count, "requeueing failed delivery");
            delivery.requeue().await
        }
        Settlement::DeadLetter => {
            let reason = match result {
                Err(err) => err.to_string(),
                Ok(()) => String::new(),
            };
            warn!(worker_id, queue, delivery_count, reason = %reason, "dead-lettering delivery");
            delivery.dead_letter(reason).await
        }
    };
    if let Err(err) = settled {
        error!(worker_id, queue, error = %err, "settling delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{QueueError, StorageError};
    use rstest::rstest;

    fn storage_failure() -> Result<(), OrchestratorError> {
        Err(StorageError::Backend("down".into()).into())
    }

    #[rstest]
    #[case(Ok(()), 1, Settlement::Ack)]
    #[case(storage_failure(), 1, Settlement::Requeue)]
    #[case(storage_failure(), 2, Settlement::Requeue)]
    #[case(storage_failure(), 3, Settlement::DeadLetter)]
    #[case(Err(QueueError::Closed("gemini".into()).into()), 3, Settlement::DeadLetter)]
    #[case(Err(OrchestratorError::NotFound("x".into())), 1, Settlement::DeadLetter)]
    #[case(Err(OrchestratorError::Validation(vec!["context".into()])), 1, Settlement::DeadLetter)]
    fn settles_by_retryability_and_count(
        #[case] result: Result<(), OrchestratorError>,
        #[case] delivery_count: u32,
        #[case] expected: Settlement,
    ) {
        let policy = DeliveryPolicy {
            max_delivery_count: 3,
        };
        assert_eq!(policy.settle(&result, delivery_count), expected);
    }

    #[tokio::test]
    async fn empty_group_shuts_down() {
        let group = ConsumerGroup::new();
        assert!(group.is_empty());
        group.shutdown_and_join().await;
    }
}
