//! Domain model: identifiers, actions, the run document, wire messages.

pub mod action;
pub mod ids;
pub mod language;
pub mod message;
pub mod run;

pub use self::action::{Action, UnknownAction};
pub use self::ids::RequestId;
pub use self::language::{SUPPORTED_LANGUAGES, is_supported};
pub use self::message::{CallbackRequest, OrchestratorRequest, ReasoningRequest, WireMessage};
pub use self::run::{PipelineRun, RunPatch};
