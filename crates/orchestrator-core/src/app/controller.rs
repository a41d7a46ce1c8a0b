//! Controller - turns raw deliveries into use-case calls.

use std::sync::Arc;
use tracing::error;

use super::usecase::OrchestrateUseCase;
use crate::domain::{CallbackRequest, OrchestratorRequest, WireMessage};
use crate::error::OrchestratorError;

/// Which inbound queue a delivery came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Start of a stage ([`OrchestratorRequest`]).
    Request,
    /// Answer from the reasoning service ([`CallbackRequest`]).
    Callback,
}

pub struct Controller {
    use_case: Arc<OrchestrateUseCase>,
}

impl Controller {
    pub fn new(use_case: Arc<OrchestrateUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, inbound: Inbound, body: &[u8]) -> Result<(), OrchestratorError> {
        match inbound {
            Inbound::Request => {
                let request: OrchestratorRequest = decode(body)?;
                self.use_case.orchestrate(&request).await
            }
            Inbound::Callback => {
                let callback: CallbackRequest = decode(body)?;
                self.use_case.orchestrate_callback(&callback).await
            }
        }
    }
}

fn decode<M: WireMessage>(body: &[u8]) -> Result<M, OrchestratorError> {
    M::decode(body).map_err(|err| {
        error!(details = "process error", kind = M::KIND, error = %err, "controller.decode");
        OrchestratorError::Codec(err)
    })
}
