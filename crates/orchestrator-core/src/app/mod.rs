//! App - application layer on top of the ports and workflows.
//!
//! - **OrchestrateUseCase**: workflow lookup + phase dispatch, logged
//! - **Controller**: raw delivery body -> use case
//! - **ConsumerGroup**: worker tasks on the inbound queues
//! - **AppBuilder**: startup wiring

pub mod builder;
pub mod consumer;
pub mod controller;
pub mod usecase;

pub use self::builder::{App, AppBuilder, HANDLED_ACTIONS, StartupError};
pub use self::consumer::{ConsumerGroup, DeliveryPolicy, Settlement};
pub use self::controller::{Controller, Inbound};
pub use self::usecase::OrchestrateUseCase;
