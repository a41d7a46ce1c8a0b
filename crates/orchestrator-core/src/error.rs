use thiserror::Error;

use crate::ports::{QueueError, StorageError};

/// Failure of a request or callback phase.
///
/// Port errors are wrapped unchanged so callers can still tell a duplicate
/// key from a dropped connection.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("workflow not found for action={0}")]
    NotFound(String),

    /// Names of the run fields that are missing.
    #[error("validation failed: {}", describe_missing(.0))]
    Validation(Vec<String>),

    /// Tokens of the reasoning-service answer that are not supported codes.
    #[error("invalid AI response: {}", describe_invalid(.0))]
    InvalidAiResponse(Vec<String>),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] QueueError),

    #[error("message codec: {0}")]
    Codec(#[from] serde_json::Error),
}

impl OrchestratorError {
    /// Whether another delivery of the same message can succeed.
    ///
    /// Input problems fail the same way every time; store and broker
    /// failures may be transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Storage(_) | OrchestratorError::Transport(_)
        )
    }
}

fn describe_missing(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("\"{field}\" is required"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_invalid(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| format!("{token} is not a valid language"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_enumerate_every_entry() {
        let err = OrchestratorError::Validation(vec!["context".into(), "locations".into()]);
        assert_eq!(
            err.to_string(),
            "validation failed: \"context\" is required; \"locations\" is required"
        );

        let err = OrchestratorError::InvalidAiResponse(vec!["xx".into(), "yy".into()]);
        assert_eq!(
            err.to_string(),
            "invalid AI response: xx is not a valid language; yy is not a valid language"
        );
    }

    #[test]
    fn only_infrastructure_failures_are_retryable() {
        assert!(OrchestratorError::Storage(StorageError::Backend("down".into())).is_retryable());
        assert!(OrchestratorError::Transport(QueueError::Closed("gemini".into())).is_retryable());
        assert!(!OrchestratorError::NotFound("nope".into()).is_retryable());
        assert!(!OrchestratorError::Validation(vec!["context".into()]).is_retryable());
        assert!(!OrchestratorError::InvalidAiResponse(vec!["xx".into()]).is_retryable());
    }
}
