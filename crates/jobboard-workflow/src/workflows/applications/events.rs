use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ApplicationState;
use super::domain::ApplicationId;

/// Side effects produced by the workflow engine for an outbound dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    ApplicationTransitioned {
        application_id: ApplicationId,
        from: ApplicationState,
        to: ApplicationState,
        at: DateTime<Utc>,
    },
    NotificationAppended {
        application_id: ApplicationId,
        title: String,
        at: DateTime<Utc>,
    },
    DocumentsSupplemented {
        application_id: ApplicationId,
        count: usize,
        at: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    pub fn application_id(&self) -> &ApplicationId {
        match self {
            WorkflowEvent::ApplicationTransitioned { application_id, .. }
            | WorkflowEvent::NotificationAppended { application_id, .. }
            | WorkflowEvent::DocumentsSupplemented { application_id, .. } => application_id,
        }
    }
}

/// Outbound hook persisting or delivering workflow events (e-mail, push, audit log).
pub trait EventNotifier: Send + Sync {
    fn notify(&self, event: WorkflowEvent) -> Result<(), NotifierError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
