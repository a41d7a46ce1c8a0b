//! Repository ports - the run document store and the relational store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PipelineRun, RequestId, RunPatch};

/// Primary key of the request/language relation table.
pub const REQUEST_LANGUAGES_PKEY: &str = "request_languages_pkey";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("document {0} not found")]
    NotFound(RequestId),

    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    DuplicateKey { constraint: String },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// True only for a uniqueness violation on `constraint`.
    pub fn is_duplicate_key(&self, constraint: &str) -> bool {
        matches!(self, StorageError::DuplicateKey { constraint: c } if c == constraint)
    }
}

/// Document store holding one [`PipelineRun`] per request.
#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn get_by_id(&self, id: &RequestId) -> Result<PipelineRun, StorageError>;

    async fn update(&self, id: &RequestId, patch: RunPatch) -> Result<(), StorageError>;
}

/// Relational store of (request, language) facts.
#[async_trait]
pub trait LanguageRelationRepository: Send + Sync {
    /// Insert the pair. An existing pair fails with
    /// [`StorageError::DuplicateKey`] on [`REQUEST_LANGUAGES_PKEY`].
    async fn relate_language(&self, id: &RequestId, language: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_is_matched_per_constraint() {
        let err = StorageError::DuplicateKey {
            constraint: REQUEST_LANGUAGES_PKEY.to_string(),
        };
        assert!(err.is_duplicate_key(REQUEST_LANGUAGES_PKEY));
        assert!(!err.is_duplicate_key("requests_pkey"));
        assert!(!StorageError::Backend("timeout".into()).is_duplicate_key(REQUEST_LANGUAGES_PKEY));
    }
}
