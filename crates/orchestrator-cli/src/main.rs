use std::error::Error;
use std::sync::Arc;
use tokio::time::{Duration, timeout};
use tracing::{info, warn};

use orchestrator_core::app::AppBuilder;
use orchestrator_core::config::{Config, queues};
use orchestrator_core::domain::{
    Action, CallbackRequest, OrchestratorRequest, PipelineRun, ReasoningRequest, RequestId,
    WireMessage,
};
use orchestrator_core::impls::{InMemoryBroker, InMemoryLanguageRelations, InMemoryRunRepository};
use orchestrator_core::observability::init_tracing;
use orchestrator_core::ports::{Broker, RunRepository};

type BoxError = Box<dyn Error + Send + Sync>;

const DEFAULT_ANSWER: &str = "pt,en";

/// Stand-in for the reasoning service: answers every work item with `answer`
/// on the queue the item names.
async fn reasoning_service(broker: Arc<InMemoryBroker>, answer: String) -> Result<(), BoxError> {
    let inbox = broker.consumer(queues::GEMINI).await?;
    loop {
        let delivery = inbox.receive().await?;
        let item = ReasoningRequest::decode(delivery.body())?;
        info!(request_id = %item.request_id, forward_to = %item.forward_to, "reasoning service answering");

        let callback = CallbackRequest {
            request_id: item.request_id,
            action: item.action.to_string(),
            response: answer.clone(),
        };
        broker
            .publisher(&item.forward_to)
            .await?
            .publish(callback.encode()?)
            .await?;
        delivery.ack().await?;
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;
    info!(
        queue = %config.queue.address(),
        sql = %config.sql.address(),
        no_sql = %config.no_sql.address(),
        max_ai_receive_count = config.max_ai_receive_count,
        "starting ai orchestrator (in-memory adapters)"
    );

    // (A) in-memory broker and stores
    let broker = Arc::new(InMemoryBroker::new(config.create_queue_if_missing));
    for queue in queues::ALL {
        broker.declare(queue).await?;
    }
    let runs = Arc::new(InMemoryRunRepository::new());
    let relations = Arc::new(InMemoryLanguageRelations::new());

    // (B) wire the stage and start consuming
    let app = AppBuilder::new(config, broker.clone(), runs.clone(), relations.clone())
        .build()
        .await?;
    let consumers = app.spawn_consumers().await?;

    let answer = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_ANSWER.to_string());
    let reasoning = tokio::spawn(reasoning_service(broker.clone(), answer));

    // (C) a run as the upstream stage would have written it
    let run = PipelineRun::new(RequestId::generate())
        .with_context("Acme, a mid-size coffee roaster")
        .with_research("market entry")
        .with_locations(["br", "us"]);
    let id = run.id.clone();
    runs.insert(run).await;

    broker
        .publisher(queues::AI_ORCHESTRATOR)
        .await?
        .publish(OrchestratorRequest::new(id.clone(), Action::Language).encode()?)
        .await?;
    info!(request_id = %id, "language stage requested");

    // (D) wait for the hand-off to the next stage
    let search = broker.consumer(queues::GOOGLE_SEARCH).await?;
    match timeout(Duration::from_secs(10), search.receive()).await {
        Ok(delivery) => {
            let delivery = delivery?;
            let next = OrchestratorRequest::decode(delivery.body())?;
            delivery.ack().await?;

            let stored = runs.get_by_id(&id).await?;
            println!("next stage: action={} request_id={}", next.action, next.request_id);
            println!("languages on run: {:?}", stored.languages.unwrap_or_default());
            println!("relations: {:?}", relations.languages_for(&id).await);
        }
        Err(_) => {
            let dead = broker.dead_letters(queues::AI_ORCHESTRATOR_CALLBACK).await?;
            warn!(dead_letters = dead.len(), "no next-stage message within 10s");
            for letter in dead {
                println!("dead letter after {} deliveries: {}", letter.delivery_count, letter.reason);
            }
        }
    }

    // (E) stop
    reasoning.abort();
    consumers.shutdown_and_join().await;
    Ok(())
}
