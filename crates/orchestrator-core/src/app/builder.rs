//! AppBuilder - wiring of ports, workflows, use case and consumers.
//!
//! Startup is fail-fast: every queue the stage talks to is connected and
//! every expected action is checked to have a workflow before any message
//! is consumed.

use std::sync::Arc;

use super::consumer::{ConsumerGroup, DeliveryPolicy};
use super::controller::{Controller, Inbound};
use super::usecase::OrchestrateUseCase;
use crate::config::{Config, queues};
use crate::domain::Action;
use crate::ports::{Broker, LanguageRelationRepository, QueueError, RunRepository};
use crate::workflow::{LanguageWorkflow, RegistryError, WorkflowRegistry};

/// Actions this stage must be able to handle.
pub const HANDLED_ACTIONS: &[Action] = &[Action::Language];

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("broker: {0}")]
    Queue(#[from] QueueError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),
}

/// # Example
/// ```ignore
/// let app = AppBuilder::new(config, broker, runs, relations).build().await?;
/// let consumers = app.spawn_consumers().await?;
/// ```
pub struct AppBuilder {
    config: Config,
    broker: Arc<dyn Broker>,
    runs: Arc<dyn RunRepository>,
    relations: Arc<dyn LanguageRelationRepository>,
}

impl AppBuilder {
    pub fn new(
        config: Config,
        broker: Arc<dyn Broker>,
        runs: Arc<dyn RunRepository>,
        relations: Arc<dyn LanguageRelationRepository>,
    ) -> Self {
        Self {
            config,
            broker,
            runs,
            relations,
        }
    }

    pub async fn build(self) -> Result<App, StartupError> {
        let language = LanguageWorkflow::new(
            self.broker.publisher(queues::GEMINI).await?,
            self.broker.publisher(queues::GOOGLE_SEARCH).await?,
            queues::AI_ORCHESTRATOR_CALLBACK,
            Arc::clone(&self.runs),
            Arc::clone(&self.relations),
        );

        let registry = WorkflowRegistry::builder()
            .register(Arc::new(language))?
            .expect(HANDLED_ACTIONS)
            .build()?;

        let use_case = Arc::new(OrchestrateUseCase::new(Arc::new(registry)));
        let controller = Arc::new(Controller::new(Arc::clone(&use_case)));

        Ok(App {
            config: self.config,
            broker: self.broker,
            use_case,
            controller,
        })
    }
}

/// A wired stage, ready to consume.
pub struct App {
    config: Config,
    broker: Arc<dyn Broker>,
    pub use_case: Arc<OrchestrateUseCase>,
    pub controller: Arc<Controller>,
}

impl App {
    /// Start consumers on the request and callback queues.
    pub async fn spawn_consumers(&self) -> Result<ConsumerGroup, StartupError> {
        let policy = DeliveryPolicy {
            max_delivery_count: self.config.max_ai_receive_count,
        };
        let workers = self.config.workers_per_queue;

        let mut group = ConsumerGroup::new();
        for (queue, inbound) in [
            (queues::AI_ORCHESTRATOR, Inbound::Request),
            (queues::AI_ORCHESTRATOR_CALLBACK, Inbound::Callback),
        ] {
            let consumer = self.broker.consumer(queue).await?;
            group.spawn(workers, consumer, Arc::clone(&self.controller), inbound, policy);
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryBroker, InMemoryLanguageRelations, InMemoryRunRepository};

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[tokio::test]
    async fn build_fails_on_undeclared_queue() {
        let broker = Arc::new(InMemoryBroker::new(false));
        let result = AppBuilder::new(
            config(),
            broker,
            Arc::new(InMemoryRunRepository::new()),
            Arc::new(InMemoryLanguageRelations::new()),
        )
        .build()
        .await;

        assert!(matches!(
            result,
            Err(StartupError::Queue(QueueError::UnknownQueue(q))) if q == queues::GEMINI
        ));
    }

    #[tokio::test]
    async fn built_app_handles_language_and_spawns_consumers() {
        let broker = Arc::new(InMemoryBroker::with_queues(&queues::ALL).await);
        let app = AppBuilder::new(
            Config {
                workers_per_queue: 2,
                ..config()
            },
            broker,
            Arc::new(InMemoryRunRepository::new()),
            Arc::new(InMemoryLanguageRelations::new()),
        )
        .build()
        .await
        .unwrap();

        assert_eq!(app.use_case.registry().actions(), HANDLED_ACTIONS);

        let consumers = app.spawn_consumers().await.unwrap();
        assert_eq!(consumers.len(), 4);
        consumers.shutdown_and_join().await;
    }
}
