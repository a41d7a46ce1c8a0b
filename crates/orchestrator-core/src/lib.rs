//! orchestrator-core
//!
//! Action-dispatch engine of the AI orchestrator stage of the research
//! pipeline. Inbound messages name an action; the matching workflow runs
//! its request phase (publish work for the reasoning service) or its
//! callback phase (persist the answer, trigger the next stage).
//!
//! # Modules
//! - **domain**: ids, actions, the run document, wire messages
//! - **ports**: broker and store traits
//! - **impls**: in-memory broker and stores
//! - **workflow**: `Workflow` trait, registry, language workflow
//! - **app**: use case, controller, consumers, startup wiring
//! - **config**, **observability**, **error**

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod workflow;

pub use self::error::OrchestratorError;
