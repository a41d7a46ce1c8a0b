//! Workflows - one two-phase strategy per pipeline stage.
//!
//! A stage runs in two halves joined by a queue round trip:
//! - **request**: prepare work for an external service and publish it;
//! - **callback**: take the service's answer, persist it, trigger the next
//!   stage.
//!
//! Workflows hold no state between calls; everything durable lives in the
//! stores behind [`crate::ports`].

pub mod language;
pub mod prompt;
pub mod registry;

pub use self::language::LanguageWorkflow;
pub use self::registry::{RegistryBuilder, RegistryError, WorkflowRegistry};

use async_trait::async_trait;

use crate::domain::{Action, CallbackRequest, OrchestratorRequest};
use crate::error::OrchestratorError;

#[async_trait]
pub trait Workflow: Send + Sync {
    /// Action this workflow is registered under.
    fn action(&self) -> Action;

    async fn request(&self, request: &OrchestratorRequest) -> Result<(), OrchestratorError>;

    async fn callback(&self, callback: &CallbackRequest) -> Result<(), OrchestratorError>;
}
