use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};

use super::catalog::{ApplicationState, UnknownStateError};
use super::clock::Clock;
use super::domain::{Application, ApplicationId, ApplicationSubmission, DocumentRef};
use super::engine::{TransitionOutcome, WorkflowEngine, WorkflowError, WorkflowPolicy};
use super::events::{EventNotifier, NotifierError, WorkflowEvent};
use super::progress::{ProgressProjector, ProgressView};
use super::repository::{ApplicationRepository, ApplicationStatusView, RepositoryError};

/// Recruiter request to move an application to another state.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    /// Raw state code; parsed here so unknown values surface as their own error.
    pub target: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Version the caller last saw. A mismatch means someone else moved first.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Candidate upload of supplementary documents.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSubmission {
    pub files: Vec<DocumentRef>,
}

/// Service composing the repository, notifier, and workflow engine.
pub struct ApplicationWorkflowService<R, N, C> {
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: Arc<WorkflowEngine<C>>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, N, C> ApplicationWorkflowService<R, N, C>
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, clock: C, policy: WorkflowPolicy) -> Self {
        Self {
            repository,
            notifier,
            engine: Arc::new(WorkflowEngine::new(clock, policy)),
        }
    }

    /// Open a new application in `SUBMITTED`.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, ApplicationServiceError> {
        let now = self.engine.clock().now();
        let record = Application::submit(next_application_id(), submission, now);
        let stored = self.repository.insert(record)?;
        info!(application_id = %stored.id.0, post = %stored.post_ref.0, "application submitted");
        Ok(stored)
    }

    /// Validate and apply a recruiter transition, persist it, then dispatch its events.
    pub fn transition(
        &self,
        application_id: &ApplicationId,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, ApplicationServiceError> {
        let target = ApplicationState::parse(&request.target).map_err(|err| {
            warn!(application_id = %application_id.0, value = %err.value, "unknown target state requested");
            err
        })?;

        let current = self.load(application_id)?;
        if let Some(expected) = request.expected_version {
            if expected != current.version {
                return Err(RepositoryError::VersionConflict {
                    expected,
                    actual: current.version,
                }
                .into());
            }
        }

        let outcome = self
            .engine
            .apply_transition(&current, target, request.note.as_deref())
            .map_err(|err| {
                match &err {
                    WorkflowError::TerminalState { state } => error!(
                        application_id = %application_id.0,
                        %state,
                        %target,
                        "transition attempted on a closed application"
                    ),
                    other => warn!(application_id = %application_id.0, error = %other, "transition rejected"),
                }
                err
            })?;

        self.repository
            .update(outcome.application.clone(), current.version)?;
        info!(
            application_id = %application_id.0,
            from = %current.state,
            to = %target,
            version = outcome.application.version,
            "application transitioned"
        );

        self.dispatch(&outcome.events)?;
        Ok(outcome)
    }

    /// Append candidate documents while the recruiter is requesting them.
    pub fn supplement_documents(
        &self,
        application_id: &ApplicationId,
        submission: DocumentSubmission,
    ) -> Result<Application, ApplicationServiceError> {
        let current = self.load(application_id)?;
        let count = submission.files.len();
        let updated = self.engine.append_documents(&current, submission.files)?;

        if updated.version == current.version {
            return Ok(updated);
        }

        self.repository.update(updated.clone(), current.version)?;
        info!(application_id = %application_id.0, count, "documents supplemented");

        self.dispatch(&[WorkflowEvent::DocumentsSupplemented {
            application_id: application_id.clone(),
            count,
            at: self.engine.clock().now(),
        }])?;
        Ok(updated)
    }

    /// Fetch an application snapshot.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, ApplicationServiceError> {
        self.load(application_id)
    }

    pub fn status(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationStatusView, ApplicationServiceError> {
        let record = self.load(application_id)?;
        Ok(ApplicationStatusView::from_application(&record))
    }

    pub fn progress(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ProgressView, ApplicationServiceError> {
        let record = self.load(application_id)?;
        Ok(ProgressProjector::project(&record))
    }

    pub fn list(
        &self,
        state: Option<ApplicationState>,
    ) -> Result<Vec<ApplicationStatusView>, ApplicationServiceError> {
        let records = self.repository.list(state).map_err(Self::surface)?;
        Ok(records
            .iter()
            .map(ApplicationStatusView::from_application)
            .collect())
    }

    fn load(&self, application_id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        self.repository
            .fetch(application_id)
            .map_err(Self::surface)?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }

    /// Stored records with unknown state codes are reported as corruption, not masked.
    fn surface(err: RepositoryError) -> ApplicationServiceError {
        match err {
            RepositoryError::Corrupted(unknown) => {
                error!(value = %unknown.value, "stored application carries an unknown state");
                ApplicationServiceError::CorruptedRecord(unknown)
            }
            other => ApplicationServiceError::Repository(other),
        }
    }

    /// Sends every event even if one fails; the first failure is returned.
    fn dispatch(&self, events: &[WorkflowEvent]) -> Result<(), ApplicationServiceError> {
        let mut first_failure = None;
        for event in events {
            if let Err(err) = self.notifier.notify(event.clone()) {
                warn!(application_id = %event.application_id().0, error = %err, "event dispatch failed");
                first_failure.get_or_insert(err);
            }
        }

        match first_failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Error raised by the application workflow service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),
    #[error("stored application is corrupted: {0}")]
    CorruptedRecord(UnknownStateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notifier(#[from] NotifierError),
}

impl ApplicationServiceError {
    pub const fn kind(&self) -> &'static str {
        match self {
            ApplicationServiceError::Workflow(err) => err.kind(),
            ApplicationServiceError::UnknownState(_) => "unknown_state",
            ApplicationServiceError::CorruptedRecord(_) => "corrupted_record",
            ApplicationServiceError::Repository(RepositoryError::NotFound) => "not_found",
            ApplicationServiceError::Repository(RepositoryError::Conflict) => "conflict",
            ApplicationServiceError::Repository(RepositoryError::VersionConflict { .. }) => {
                "version_conflict"
            }
            ApplicationServiceError::Repository(_) => "repository_unavailable",
            ApplicationServiceError::Notifier(_) => "notifier_unavailable",
        }
    }
}
