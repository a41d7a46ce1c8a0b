//! In-memory document and relational stores (development / tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::domain::{PipelineRun, RequestId, RunPatch};
use crate::ports::{
    LanguageRelationRepository, REQUEST_LANGUAGES_PKEY, RunRepository, StorageError,
};

/// Run documents keyed by id.
#[derive(Default)]
pub struct InMemoryRunRepository {
    runs: Mutex<HashMap<RequestId, PipelineRun>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub async fn insert(&self, run: PipelineRun) {
        self.runs.lock().await.insert(run.id.clone(), run);
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn get_by_id(&self, id: &RequestId) -> Result<PipelineRun, StorageError> {
        self.runs
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    async fn update(&self, id: &RequestId, patch: RunPatch) -> Result<(), StorageError> {
        let mut runs = self.runs.lock().await;
        let run = runs
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        run.apply(patch);
        run.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Rows of the request/language table, with the time they were written.
#[derive(Default)]
pub struct InMemoryLanguageRelations {
    rows: Mutex<BTreeMap<(RequestId, String), DateTime<Utc>>>,
}

impl InMemoryLanguageRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Languages related to `id`, sorted.
    pub async fn languages_for(&self, id: &RequestId) -> Vec<String> {
        self.rows
            .lock()
            .await
            .keys()
            .filter(|(request_id, _)| request_id == id)
            .map(|(_, language)| language.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LanguageRelationRepository for InMemoryLanguageRelations {
    async fn relate_language(&self, id: &RequestId, language: &str) -> Result<(), StorageError> {
        let mut rows = self.rows.lock().await;
        let key = (id.clone(), language.to_string());
        if rows.contains_key(&key) {
            return Err(StorageError::DuplicateKey {
                constraint: REQUEST_LANGUAGES_PKEY.to_string(),
            });
        }
        rows.insert(key, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_patches_and_stamps_the_document() {
        let repo = InMemoryRunRepository::new();
        let id = RequestId::new("r1");
        repo.insert(PipelineRun::new(id.clone()).with_context("Acme")).await;

        repo.update(&id, RunPatch::languages(vec!["pt".into()]))
            .await
            .unwrap();

        let run = repo.get_by_id(&id).await.unwrap();
        assert_eq!(run.context.as_deref(), Some("Acme"));
        assert_eq!(run.languages, Some(vec!["pt".to_string()]));
        assert!(run.updated_at.is_some());
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let repo = InMemoryRunRepository::new();
        let id = RequestId::new("ghost");

        assert_eq!(
            repo.get_by_id(&id).await.unwrap_err(),
            StorageError::NotFound(id.clone())
        );
        assert_eq!(
            repo.update(&id, RunPatch::default()).await.unwrap_err(),
            StorageError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn second_insert_of_a_pair_is_a_duplicate_key() {
        let relations = InMemoryLanguageRelations::new();
        let id = RequestId::new("r1");

        relations.relate_language(&id, "en").await.unwrap();
        let err = relations.relate_language(&id, "en").await.unwrap_err();
        assert!(err.is_duplicate_key(REQUEST_LANGUAGES_PKEY));

        relations.relate_language(&id, "pt").await.unwrap();
        relations
            .relate_language(&RequestId::new("r2"), "en")
            .await
            .unwrap();
        assert_eq!(relations.languages_for(&id).await, vec!["en", "pt"]);
        assert_eq!(relations.len().await, 3);
    }
}
