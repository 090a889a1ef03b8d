use serde::{Deserialize, Serialize};

use super::catalog::{ApplicationState, StateCatalog};
use super::clock::Clock;
use super::domain::{Application, DocumentRef, Milestone, Notification};
use super::events::WorkflowEvent;
use super::transitions::{NoteRequirement, TransitionTable};

/// Tunables applied on top of the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPolicy {
    /// Enforce the note requirement when asking a candidate for documents.
    pub require_request_note: bool,
    /// Upper bound on supplementary documents per application.
    pub max_documents: usize,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            require_request_note: true,
            max_documents: 20,
        }
    }
}

/// Rejected workflow operations. None of them leave a partial update behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("transition {from} -> {to} is not permitted")]
    InvalidTransition {
        from: ApplicationState,
        to: ApplicationState,
    },
    #[error("application is closed in terminal state {state}")]
    TerminalState { state: ApplicationState },
    #[error("documents can only be supplemented while REQUESTED, application is {state}")]
    InvalidStateForUpload { state: ApplicationState },
    #[error("moving to {to} requires a note for the candidate")]
    MissingNote { to: ApplicationState },
    #[error("document limit of {limit} exceeded ({attempted} requested)")]
    DocumentLimitExceeded { limit: usize, attempted: usize },
}

impl WorkflowError {
    /// Stable machine-readable code for API consumers.
    pub const fn kind(&self) -> &'static str {
        match self {
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::TerminalState { .. } => "terminal_state",
            WorkflowError::InvalidStateForUpload { .. } => "invalid_state_for_upload",
            WorkflowError::MissingNote { .. } => "missing_note",
            WorkflowError::DocumentLimitExceeded { .. } => "document_limit_exceeded",
        }
    }
}

/// Result of an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub application: Application,
    pub events: Vec<WorkflowEvent>,
}

/// Stateless transition validator. All state lives in the [`Application`] snapshot.
pub struct WorkflowEngine<C> {
    clock: C,
    policy: WorkflowPolicy,
}

impl<C: Clock> WorkflowEngine<C> {
    pub fn new(clock: C, policy: WorkflowPolicy) -> Self {
        Self { clock, policy }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn apply_transition(
        &self,
        application: &Application,
        target: ApplicationState,
        note: Option<&str>,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let from = application.state;
        if from.is_terminal() {
            return Err(WorkflowError::TerminalState { state: from });
        }
        if !TransitionTable::is_allowed(from, target) {
            return Err(WorkflowError::InvalidTransition { from, to: target });
        }

        let note = note.map(str::trim).filter(|text| !text.is_empty());
        if note.is_none() && self.note_required(target) {
            return Err(WorkflowError::MissingNote { to: target });
        }

        let now = self.clock.now();
        let mut updated = application.clone();
        updated.state = target;
        updated.stamp(Milestone::for_state(target), now);
        updated.version += 1;

        let mut events = vec![WorkflowEvent::ApplicationTransitioned {
            application_id: updated.id.clone(),
            from,
            to: target,
            at: now,
        }];

        if let Some(content) = note {
            let title = StateCatalog::notification_title(target);
            updated.notifications.push(Notification {
                title: title.clone(),
                content: content.to_string(),
                created_at: now,
            });
            events.push(WorkflowEvent::NotificationAppended {
                application_id: updated.id.clone(),
                title,
                at: now,
            });
        }

        Ok(TransitionOutcome {
            application: updated,
            events,
        })
    }

    /// Appends supplementary documents in submission order. Never changes state.
    pub fn append_documents(
        &self,
        application: &Application,
        files: Vec<DocumentRef>,
    ) -> Result<Application, WorkflowError> {
        if application.state != ApplicationState::Requested {
            return Err(WorkflowError::InvalidStateForUpload {
                state: application.state,
            });
        }

        let attempted = application.documents.len() + files.len();
        if attempted > self.policy.max_documents {
            return Err(WorkflowError::DocumentLimitExceeded {
                limit: self.policy.max_documents,
                attempted,
            });
        }

        let mut updated = application.clone();
        if !files.is_empty() {
            updated.documents.extend(files);
            updated.version += 1;
        }
        Ok(updated)
    }

    fn note_required(&self, target: ApplicationState) -> bool {
        match TransitionTable::requirement(target) {
            NoteRequirement::Required => {
                target != ApplicationState::Requested || self.policy.require_request_note
            }
            NoteRequirement::Optional => false,
        }
    }
}
