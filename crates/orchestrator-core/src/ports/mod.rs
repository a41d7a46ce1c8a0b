//! Ports - interfaces to the external collaborators.
//!
//! The broker, the document store and the relational store are reached only
//! through these traits. Development implementations live in
//! [`crate::impls`].

pub mod queue;
pub mod repository;

pub use self::queue::{Broker, Delivery, QueueConsumer, QueueError, QueuePublisher};
pub use self::repository::{
    LanguageRelationRepository, REQUEST_LANGUAGES_PKEY, RunRepository, StorageError,
};
