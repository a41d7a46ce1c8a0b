//! LanguageWorkflow - choose the search languages of a run.
//!
//! - request: read `context`, `research` and `locations` from the run and
//!   ask the reasoning service which languages fit them;
//! - callback: validate the answer, relate every language to the run,
//!   store the list on the run and trigger the sentences stage.
//!
//! Both phases are safe to re-run for the same message: relation inserts
//! that hit the primary key count as done and the run update overwrites.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::Workflow;
use super::prompt::{PromptInput, language_prompt};
use crate::domain::{
    Action, CallbackRequest, OrchestratorRequest, PipelineRun, ReasoningRequest, RequestId,
    RunPatch, SUPPORTED_LANGUAGES, WireMessage, is_supported,
};
use crate::error::OrchestratorError;
use crate::ports::{
    LanguageRelationRepository, QueuePublisher, REQUEST_LANGUAGES_PKEY, RunRepository,
    StorageError,
};

pub struct LanguageWorkflow {
    reasoning_queue: Arc<dyn QueuePublisher>,
    next_stage_queue: Arc<dyn QueuePublisher>,
    callback_queue: String,
    runs: Arc<dyn RunRepository>,
    relations: Arc<dyn LanguageRelationRepository>,
}

impl LanguageWorkflow {
    /// `callback_queue` is where the reasoning service must send its answer.
    pub fn new(
        reasoning_queue: Arc<dyn QueuePublisher>,
        next_stage_queue: Arc<dyn QueuePublisher>,
        callback_queue: impl Into<String>,
        runs: Arc<dyn RunRepository>,
        relations: Arc<dyn LanguageRelationRepository>,
    ) -> Self {
        Self {
            reasoning_queue,
            next_stage_queue,
            callback_queue: callback_queue.into(),
            runs,
            relations,
        }
    }

    async fn run_request(&self, request: &OrchestratorRequest) -> Result<(), OrchestratorError> {
        let run = self.runs.get_by_id(&request.request_id).await?;
        let (context, research, locations) = required_inputs(&run)?;

        let prompt = language_prompt(&PromptInput {
            supported_languages: SUPPORTED_LANGUAGES,
            context,
            research,
            locations,
        });
        let item = ReasoningRequest {
            request_id: request.request_id.clone(),
            prompt,
            forward_to: self.callback_queue.clone(),
            action: Action::Language,
        };

        self.reasoning_queue.publish(item.encode()?).await?;
        debug!(
            queue = self.reasoning_queue.queue_name(),
            "languageWorkflow.request: prompt published"
        );
        Ok(())
    }

    async fn run_callback(&self, callback: &CallbackRequest) -> Result<(), OrchestratorError> {
        let languages = parse_language_answer(&callback.response)?;

        self.relate_languages(&callback.request_id, &languages)
            .await?;
        debug!(count = languages.len(), "languageWorkflow.callback: languages related");

        self.runs
            .update(&callback.request_id, RunPatch::languages(languages))
            .await?;

        let next = OrchestratorRequest::new(callback.request_id.clone(), Action::Sentences);
        self.next_stage_queue.publish(next.encode()?).await?;
        Ok(())
    }

    /// Insert every (request, language) pair concurrently.
    ///
    /// The first failure other than a duplicate primary key aborts the
    /// remaining inserts. All tasks are joined before returning, so the
    /// result only depends on which failure completed first.
    async fn relate_languages(
        &self,
        request_id: &RequestId,
        languages: &[String],
    ) -> Result<(), StorageError> {
        let mut inserts = JoinSet::new();
        for language in languages {
            let relations = Arc::clone(&self.relations);
            let request_id = request_id.clone();
            let language = language.clone();
            inserts.spawn(async move {
                match relations.relate_language(&request_id, &language).await {
                    Err(err) if err.is_duplicate_key(REQUEST_LANGUAGES_PKEY) => Ok(()),
                    other => other,
                }
            });
        }

        let mut first_error = None;
        while let Some(joined) = inserts.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(join_err) if join_err.is_cancelled() => continue,
                Err(join_err) => StorageError::Backend(format!("relation insert task: {join_err}")),
            };
            if first_error.is_none() {
                inserts.abort_all();
                first_error = Some(failure);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Workflow for LanguageWorkflow {
    fn action(&self) -> Action {
        Action::Language
    }

    async fn request(&self, request: &OrchestratorRequest) -> Result<(), OrchestratorError> {
        info!(details = "process started", "languageWorkflow.request");
        self.run_request(request).await.inspect_err(|err| {
            error!(details = "process error", error = %err, "languageWorkflow.request");
        })
    }

    async fn callback(&self, callback: &CallbackRequest) -> Result<(), OrchestratorError> {
        info!(details = "process started", "languageWorkflow.callback");
        match self.run_callback(callback).await {
            Ok(()) => {
                info!(details = "process finished", "languageWorkflow.callback");
                Ok(())
            }
            Err(err) => {
                error!(details = "process error", error = %err, "languageWorkflow.callback");
                Err(err)
            }
        }
    }
}

/// `context`, `research` and `locations` of the run, or a validation error
/// naming every one that is missing.
fn required_inputs(run: &PipelineRun) -> Result<(&str, &str, &[String]), OrchestratorError> {
    match (&run.context, &run.research, &run.locations) {
        (Some(context), Some(research), Some(locations)) => {
            Ok((context.as_str(), research.as_str(), locations.as_slice()))
        }
        (context, research, locations) => {
            let missing = [
                ("context", context.is_none()),
                ("research", research.is_none()),
                ("locations", locations.is_none()),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(field, _)| field.to_string())
            .collect();
            Err(OrchestratorError::Validation(missing))
        }
    }
}

/// Turn the raw answer into language codes.
///
/// The answer is lower-cased and split on commas; a region suffix
/// (`pt-br`) is cut off. Order and duplicates are kept. Any unsupported
/// code fails the whole answer, listing all of them.
pub fn parse_language_answer(answer: &str) -> Result<Vec<String>, OrchestratorError> {
    let mut accepted = Vec::new();
    let mut invalid = Vec::new();

    for candidate in answer.to_lowercase().split(',') {
        let code = match candidate.split_once('-') {
            Some((prefix, _region)) => prefix,
            None => candidate,
        }
        .trim();

        if is_supported(code) {
            accepted.push(code.to_string());
        } else {
            invalid.push(code.to_string());
        }
    }

    if !invalid.is_empty() {
        return Err(OrchestratorError::InvalidAiResponse(invalid));
    }
    Ok(accepted)
}
