//! Domain identifiers.
//!
//! `RequestId` identifies one pipeline run across every stage. It is assigned
//! upstream (the stage that created the run document) and is treated as an
//! opaque string here.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of a pipeline run (aggregate document key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh ULID-based id, for local runs and tests.
    pub fn generate() -> Self {
        Self::from(Ulid::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Ulid> for RequestId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid.to_string().to_lowercase())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
