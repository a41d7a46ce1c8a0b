//! Action identifiers: which workflow handles a message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage selected by the `action` field of a message.
///
/// The wire form is the lowercase name (`"language"`, `"sentences"`).
/// Messages keep the raw string so that an unknown action can still be
/// reported back verbatim by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Pick the search languages for a run.
    Language,

    /// Build the search sentences (next stage after `Language`).
    Sentences,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Language, Action::Sentences];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Language => "language",
            Action::Sentences => "sentences",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action={0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
