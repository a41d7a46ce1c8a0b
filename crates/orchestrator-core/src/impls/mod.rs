//! Impls - development implementations of the ports.
//!
//! Production adapters (AMQP broker, document database, SQL database) are
//! external collaborators and plug in through the same traits.

pub mod inmem_broker;
pub mod inmem_store;

pub use self::inmem_broker::{DeadLetter, InMemoryBroker};
pub use self::inmem_store::{InMemoryLanguageRelations, InMemoryRunRepository};
