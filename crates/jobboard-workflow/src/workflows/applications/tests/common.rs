use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applications::catalog::ApplicationState;
use crate::workflows::applications::clock::ManualClock;
use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationSubmission, DocumentRef, PostRef, ResumeRef,
};
use crate::workflows::applications::engine::WorkflowPolicy;
use crate::workflows::applications::events::{EventNotifier, NotifierError, WorkflowEvent};
use crate::workflows::applications::repository::{
    decode_stored, ApplicationRepository, RepositoryError,
};
use crate::workflows::applications::service::{ApplicationWorkflowService, TransitionRequest};
use crate::workflows::applications::application_router;

pub(super) type TestService =
    ApplicationWorkflowService<MemoryRepository, MemoryNotifier, Arc<ManualClock>>;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        resume_ref: ResumeRef("resume-nguyen-van-a".to_string()),
        post_ref: PostRef("post-backend-engineer".to_string()),
    }
}

pub(super) fn document(name: &str) -> DocumentRef {
    DocumentRef {
        name: name.to_string(),
        storage_key: format!("uploads/{name}.pdf"),
    }
}

pub(super) fn request(target: &str, note: Option<&str>) -> TransitionRequest {
    TransitionRequest {
        target: target.to_string(),
        note: note.map(str::to_string),
        expected_version: None,
    }
}

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
    Arc<ManualClock>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let clock = Arc::new(ManualClock::new(start()));
    let service = ApplicationWorkflowService::new(
        repository.clone(),
        notifier.clone(),
        clock.clone(),
        WorkflowPolicy::default(),
    );
    (service, repository, notifier, clock)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: Application, expected_version: u64) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, state: Option<ApplicationState>) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| state.map_or(true, |state| record.state == state))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<WorkflowEvent>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl EventNotifier for MemoryNotifier {
    fn notify(&self, event: WorkflowEvent) -> Result<(), NotifierError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl EventNotifier for OfflineNotifier {
    fn notify(&self, _event: WorkflowEvent) -> Result<(), NotifierError> {
        Err(NotifierError::Transport("smtp relay down".to_string()))
    }
}

/// Persisted row for a legacy application whose state code the workflow no longer knows.
pub(super) fn legacy_row() -> String {
    let record = Application::submit(
        ApplicationId("app-legacy".to_string()),
        submission(),
        start(),
    );
    let mut row = serde_json::to_value(&record).expect("serializes");
    row["state"] = Value::String("ARCHIVED".to_string());
    row.to_string()
}

/// Repository backed by raw JSON rows, one of which carries an unknown state code.
pub(super) struct CorruptedRepository;

impl ApplicationRepository for CorruptedRepository {
    fn insert(&self, record: Application) -> Result<Application, RepositoryError> {
        Ok(record)
    }

    fn update(&self, _record: Application, _expected_version: u64) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        decode_stored(&legacy_row()).map(Some)
    }

    fn list(&self, _state: Option<ApplicationState>) -> Result<Vec<Application>, RepositoryError> {
        Ok(vec![decode_stored(&legacy_row())?])
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: Application, _expected_version: u64) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _state: Option<ApplicationState>) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn application_router_with_service(service: TestService) -> axum::Router {
    application_router(Arc::new(service))
}
