//! OrchestrateUseCase - entry point for inbound request and callback
//! messages.

use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};

use crate::domain::{CallbackRequest, OrchestratorRequest, RequestId};
use crate::error::OrchestratorError;
use crate::workflow::WorkflowRegistry;

/// Resolves the workflow for a message and runs the matching phase.
///
/// Errors are logged once here and returned unchanged; nothing is retried.
pub struct OrchestrateUseCase {
    registry: Arc<WorkflowRegistry>,
}

impl OrchestrateUseCase {
    pub fn new(registry: Arc<WorkflowRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    pub async fn orchestrate(&self, request: &OrchestratorRequest) -> Result<(), OrchestratorError> {
        logged(
            "useCase.orchestrate",
            &request.request_id,
            &request.action,
            async {
                let workflow = self.registry.resolve(&request.action)?;
                workflow.request(request).await
            },
        )
        .await
    }

    pub async fn orchestrate_callback(
        &self,
        callback: &CallbackRequest,
    ) -> Result<(), OrchestratorError> {
        logged(
            "useCase.orchestrateCallback",
            &callback.request_id,
            &callback.action,
            async {
                let workflow = self.registry.resolve(&callback.action)?;
                workflow.callback(callback).await
            },
        )
        .await
    }
}

/// Run `phase` inside a span, logging start, error and finish.
async fn logged<F>(
    operation: &'static str,
    request_id: &RequestId,
    action: &str,
    phase: F,
) -> Result<(), OrchestratorError>
where
    F: Future<Output = Result<(), OrchestratorError>>,
{
    let span = info_span!("orchestrate", operation, request_id = %request_id, action);
    async move {
        info!(details = "process started", "{operation}");
        match phase.await {
            Ok(()) => {
                debug!(details = "process finished", "{operation}");
                Ok(())
            }
            Err(err) => {
                error!(details = "process error", error = %err, "{operation}");
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}
