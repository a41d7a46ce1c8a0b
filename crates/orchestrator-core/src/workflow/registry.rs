//! WorkflowRegistry - action to workflow lookup.
//!
//! Built once at startup through [`RegistryBuilder`], read-only afterwards,
//! so lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use super::Workflow;
use crate::domain::Action;
use crate::error::OrchestratorError;

/// Startup errors of the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("workflow for action '{0}' is already registered")]
    DuplicateWorkflow(Action),

    #[error("missing workflows for actions: {0:?}")]
    MissingWorkflows(Vec<Action>),
}

pub struct WorkflowRegistry {
    workflows: HashMap<Action, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up the workflow for a raw action string.
    ///
    /// Unknown strings and known-but-unregistered actions both fail with
    /// [`OrchestratorError::NotFound`] carrying the string as received.
    pub fn resolve(&self, action: &str) -> Result<Arc<dyn Workflow>, OrchestratorError> {
        action
            .parse::<Action>()
            .ok()
            .and_then(|parsed| self.workflows.get(&parsed))
            .cloned()
            .ok_or_else(|| OrchestratorError::NotFound(action.to_string()))
    }

    /// Registered actions, sorted.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.workflows.keys().copied().collect();
        actions.sort();
        actions
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

/// Collects workflows and checks them against the expected actions.
///
/// # Example
/// ```ignore
/// let registry = WorkflowRegistry::builder()
///     .register(Arc::new(language_workflow))?
///     .expect(&[Action::Language])
///     .build()?;
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    workflows: HashMap<Action, Arc<dyn Workflow>>,
    expected: Vec<Action>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, workflow: Arc<dyn Workflow>) -> Result<Self, RegistryError> {
        let action = workflow.action();
        if self.workflows.contains_key(&action) {
            return Err(RegistryError::DuplicateWorkflow(action));
        }
        self.workflows.insert(action, workflow);
        Ok(self)
    }

    /// Actions that must have a workflow when `build` is called.
    pub fn expect(mut self, actions: &[Action]) -> Self {
        self.expected.extend_from_slice(actions);
        self
    }

    pub fn build(self) -> Result<WorkflowRegistry, RegistryError> {
        let missing: Vec<Action> = self
            .expected
            .iter()
            .filter(|action| !self.workflows.contains_key(*action))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::MissingWorkflows(missing));
        }
        Ok(WorkflowRegistry {
            workflows: self.workflows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallbackRequest, OrchestratorRequest, RequestId};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingWorkflow {
        requests: AtomicUsize,
        callbacks: AtomicUsize,
    }

    #[async_trait]
    impl Workflow for CountingWorkflow {
        fn action(&self) -> Action {
            Action::Language
        }

        async fn request(&self, _request: &OrchestratorRequest) -> Result<(), OrchestratorError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn callback(&self, _callback: &CallbackRequest) -> Result<(), OrchestratorError> {
            self.callbacks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolves_registered_action() {
        let workflow = Arc::new(CountingWorkflow::default());
        let registry = WorkflowRegistry::builder()
            .register(workflow.clone())
            .unwrap()
            .build()
            .unwrap();

        let resolved = registry.resolve("language").unwrap();
        resolved
            .request(&OrchestratorRequest::new(RequestId::new("r1"), Action::Language))
            .await
            .unwrap();
        assert_eq!(workflow.requests.load(Ordering::SeqCst), 1);
        assert_eq!(registry.actions(), vec![Action::Language]);
    }

    #[test]
    fn unknown_and_unregistered_actions_are_not_found() {
        let workflow = Arc::new(CountingWorkflow::default());
        let registry = WorkflowRegistry::builder()
            .register(workflow.clone())
            .unwrap()
            .build()
            .unwrap();

        for action in ["sentences", "translate", ""] {
            assert!(matches!(
                registry.resolve(action),
                Err(OrchestratorError::NotFound(a)) if a == action
            ));
        }
        assert_eq!(workflow.requests.load(Ordering::SeqCst), 0);
        assert_eq!(workflow.callbacks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let result = WorkflowRegistry::builder()
            .register(Arc::new(CountingWorkflow::default()))
            .unwrap()
            .register(Arc::new(CountingWorkflow::default()));
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateWorkflow(Action::Language))
        ));
    }

    #[test]
    fn build_reports_every_missing_expected_action() {
        let result = WorkflowRegistry::builder()
            .expect(&[Action::Language, Action::Sentences])
            .build();
        assert!(matches!(
            result,
            Err(RegistryError::MissingWorkflows(missing))
                if missing == vec![Action::Language, Action::Sentences]
        ));

        let registry = WorkflowRegistry::builder()
            .register(Arc::new(CountingWorkflow::default()))
            .unwrap()
            .expect(&[Action::Language])
            .build()
            .unwrap();
        assert_eq!(registry.len(), 1);
    }
}
