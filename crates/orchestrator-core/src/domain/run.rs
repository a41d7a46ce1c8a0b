//! PipelineRun - the aggregate document of one research request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RequestId;

/// Accumulated inputs and results of one pipeline run.
///
/// Fields are optional because each stage fills in its own part; a stage
/// checks for the inputs it needs instead of assuming defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: RequestId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<String>,

    /// Country/region codes used to filter the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,

    /// Written by the language stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            context: None,
            research: None,
            locations: None,
            languages: None,
            updated_at: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_research(mut self, research: impl Into<String>) -> Self {
        self.research = Some(research.into());
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    /// Overwrite every field set in `patch`; unset fields are left alone.
    pub fn apply(&mut self, patch: RunPatch) {
        if let Some(languages) = patch.languages {
            self.languages = Some(languages);
        }
    }
}

/// Partial update of a [`PipelineRun`].
///
/// Only the fields this stage is allowed to write are representable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

impl RunPatch {
    pub fn languages(languages: Vec<String>) -> Self {
        Self {
            languages: Some(languages),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_overwrites_languages() {
        let mut run = PipelineRun::new(RequestId::new("r1"));
        run.languages = Some(vec!["de".into(), "fr".into()]);

        run.apply(RunPatch::languages(vec!["pt".into(), "en".into()]));
        assert_eq!(run.languages, Some(vec!["pt".to_string(), "en".to_string()]));
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut run = PipelineRun::new(RequestId::new("r1")).with_context("Acme");
        let before = run.clone();

        let patch = RunPatch::default();
        assert!(patch.is_empty());
        run.apply(patch);
        assert_eq!(run, before);
    }

    #[test]
    fn document_omits_unset_fields() {
        let run = PipelineRun::new(RequestId::new("r1")).with_locations(["br", "us"]);
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "r1", "locations": ["br", "us"] }));
    }
}
