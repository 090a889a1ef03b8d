use jobboard_workflow::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationState, EventNotifier,
    NotifierError, RepositoryError, WorkflowEvent,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store. The version check and the write share one lock, so two
/// recruiters racing on the same application cannot both commit.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<BTreeMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        let actual = guard
            .get(&record.id)
            .map(|stored| stored.version)
            .ok_or(RepositoryError::NotFound)?;
        if actual != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                actual,
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
            .filter(|record| state.map_or(true, |wanted| record.state == wanted))
            .cloned()
            .collect())
    }
}

/// Notifier that records events and writes them to the log in place of e-mail or push.
#[derive(Default, Clone)]
pub(crate) struct TracingNotifier {
    events: Arc<Mutex<Vec<WorkflowEvent>>>,
}

impl EventNotifier for TracingNotifier {
    fn notify(&self, event: WorkflowEvent) -> Result<(), NotifierError> {
        match &event {
            WorkflowEvent::ApplicationTransitioned {
                application_id,
                from,
                to,
                at,
            } => info!(application_id = %application_id.0, %from, %to, %at, "dispatch transition"),
            WorkflowEvent::NotificationAppended {
                application_id,
                title,
                ..
            } => info!(application_id = %application_id.0, %title, "dispatch candidate notification"),
            WorkflowEvent::DocumentsSupplemented {
                application_id,
                count,
                ..
            } => info!(application_id = %application_id.0, count, "dispatch document upload"),
        }

        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

impl TracingNotifier {
    pub(crate) fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use jobboard_workflow::workflows::applications::{
        ApplicationSubmission, PostRef, ResumeRef,
    };

    fn record(id: &str) -> Application {
        Application::submit(
            ApplicationId(id.to_string()),
            ApplicationSubmission {
                resume_ref: ResumeRef("resume".to_string()),
                post_ref: PostRef("post".to_string()),
            },
            Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn update_is_compare_and_set_on_version() {
        let repository = InMemoryApplicationRepository::default();
        let original = repository.insert(record("app-1")).expect("insert");

        let mut next = original.clone();
        next.version = 1;
        repository.update(next.clone(), 0).expect("first write wins");

        let mut racing = original;
        racing.version = 1;
        match repository.update(racing, 0) {
            Err(RepositoryError::VersionConflict { expected, actual }) => {
                assert_eq!((expected, actual), (0, 1));
            }
            other => panic!("expected version conflict, got {other:?}"),
        }
    }

    #[test]
    fn update_requires_existing_record() {
        let repository = InMemoryApplicationRepository::default();
        assert!(matches!(
            repository.update(record("ghost"), 0),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn duplicate_insert_conflicts() {
        let repository = InMemoryApplicationRepository::default();
        repository.insert(record("app-dup")).expect("insert");
        assert!(matches!(
            repository.insert(record("app-dup")),
            Err(RepositoryError::Conflict)
        ));
    }
}
