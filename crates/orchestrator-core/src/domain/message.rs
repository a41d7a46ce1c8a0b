//! Messages exchanged with the broker.
//!
//! Every message is JSON with camelCase keys. The `action` of inbound
//! messages stays a raw string; see [`crate::domain::Action`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Action, RequestId};

/// A message type that travels through a queue.
pub trait WireMessage: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used in logs.
    const KIND: &'static str;

    fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Starts the request phase of the workflow selected by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorRequest {
    pub request_id: RequestId,
    pub action: String,
}

impl OrchestratorRequest {
    pub fn new(request_id: RequestId, action: Action) -> Self {
        Self {
            request_id,
            action: action.to_string(),
        }
    }
}

impl WireMessage for OrchestratorRequest {
    const KIND: &'static str = "orchestrator_request";
}

/// Answer of the reasoning service, routed back to the callback phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    pub request_id: RequestId,
    pub action: String,
    pub response: String,
}

impl WireMessage for CallbackRequest {
    const KIND: &'static str = "orchestrator_callback";
}

/// Work item for the reasoning service.
///
/// `forward_to` names the queue the answer must be published to; `action`
/// is echoed back in the resulting [`CallbackRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningRequest {
    pub request_id: RequestId,
    pub prompt: String,
    pub forward_to: String,
    pub action: Action,
}

impl WireMessage for ReasoningRequest {
    const KIND: &'static str = "reasoning_request";
}
