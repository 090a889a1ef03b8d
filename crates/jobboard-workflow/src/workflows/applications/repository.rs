use serde::Serialize;

use super::catalog::{ApplicationState, StateCatalog, Tone, UnknownStateError};
use super::domain::{Application, ApplicationId};
use super::progress::{ProgressProjector, ProgressView};
use super::transitions::TransitionTable;

/// Storage abstraction so the service can be exercised in isolation.
///
/// `update` is a compare-and-set on [`Application::version`]: it must only succeed when
/// the stored record still carries `expected_version`, which serialises concurrent
/// writers against one application.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError>;
    fn update(&self, record: Application, expected_version: u64) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list(&self, state: Option<ApplicationState>) -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stale write: expected version {expected}, stored version is {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("stored record is corrupted: {0}")]
    Corrupted(#[from] UnknownStateError),
    #[error("stored record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Decodes a persisted JSON row. An unknown state code is reported as
/// [`RepositoryError::Corrupted`] rather than a generic decode failure.
pub fn decode_stored(raw: &str) -> Result<Application, RepositoryError> {
    let row: serde_json::Value = serde_json::from_str(raw)?;
    if let Some(code) = row.get("state").and_then(serde_json::Value::as_str) {
        ApplicationState::parse(code)?;
    }
    Ok(serde_json::from_value(row)?)
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub state: ApplicationState,
    pub label: &'static str,
    pub icon: &'static str,
    pub tone: Tone,
    pub version: u64,
    /// Targets the recruiter UI may offer; anything else is rejected by the engine.
    pub allowed_transitions: Vec<ApplicationState>,
    pub document_count: usize,
    pub progress: ProgressView,
}

impl ApplicationStatusView {
    pub fn from_application(application: &Application) -> Self {
        let descriptor = StateCatalog::describe(application.state);
        Self {
            application_id: application.id.clone(),
            state: application.state,
            label: descriptor.label,
            icon: descriptor.icon,
            tone: descriptor.tone,
            version: application.version,
            allowed_transitions: TransitionTable::allowed_from(application.state).to_vec(),
            document_count: application.documents.len(),
            progress: ProgressProjector::project(application),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applications::domain::{ApplicationSubmission, PostRef, ResumeRef};
    use chrono::{TimeZone, Utc};

    fn stored_row(state: &str) -> String {
        let record = Application::submit(
            ApplicationId("app-000042".to_string()),
            ApplicationSubmission {
                resume_ref: ResumeRef("resume-le-van-c".to_string()),
                post_ref: PostRef("post-qa-engineer".to_string()),
            },
            Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap(),
        );
        let mut row = serde_json::to_value(&record).expect("serializes");
        row["state"] = serde_json::Value::String(state.to_string());
        row.to_string()
    }

    #[test]
    fn decode_accepts_known_codes_in_any_case() {
        let record = decode_stored(&stored_row("reviewing")).expect("decodes");
        assert_eq!(record.state, ApplicationState::Reviewing);
        assert_eq!(record.id, ApplicationId("app-000042".to_string()));
    }

    #[test]
    fn decode_reports_unknown_state_as_corruption() {
        match decode_stored(&stored_row("ARCHIVED")) {
            Err(RepositoryError::Corrupted(err)) => assert_eq!(err.value, "ARCHIVED"),
            other => panic!("expected corrupted record, got {other:?}"),
        }
    }

    #[test]
    fn decode_reports_broken_rows_as_malformed() {
        assert!(matches!(
            decode_stored("{\"id\": \"app-1\""),
            Err(RepositoryError::Malformed(_))
        ));
    }
}
