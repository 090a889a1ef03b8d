use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::ApplicationState;
use super::clock::Clock;
use super::domain::{ApplicationId, ApplicationSubmission};
use super::engine::WorkflowError;
use super::events::EventNotifier;
use super::repository::{ApplicationRepository, ApplicationStatusView, RepositoryError};
use super::service::{
    ApplicationServiceError, ApplicationWorkflowService, DocumentSubmission, TransitionRequest,
};

type SharedService<R, N, C> = Arc<ApplicationWorkflowService<R, N, C>>;

/// Router builder exposing HTTP endpoints for intake, transitions, and progress.
pub fn application_router<R, N, C>(service: SharedService<R, N, C>) -> Router
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R, N, C>).get(list_handler::<R, N, C>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, N, C>),
        )
        .route(
            "/api/v1/applications/:application_id/progress",
            get(progress_handler::<R, N, C>),
        )
        .route(
            "/api/v1/applications/:application_id/transitions",
            post(transition_handler::<R, N, C>),
        )
        .route(
            "/api/v1/applications/:application_id/documents",
            post(documents_handler::<R, N, C>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) state: Option<String>,
}

pub(crate) async fn submit_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let view = ApplicationStatusView::from_application(&record);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    let filter = match query.state.as_deref().map(ApplicationState::parse).transpose() {
        Ok(filter) => filter,
        Err(err) => return error_response(err.into()),
    };

    match service.list(filter) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    match service.status(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn progress_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    match service.progress(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transition_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    match service.transition(&ApplicationId(application_id), request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn documents_handler<R, N, C>(
    State(service): State<SharedService<R, N, C>>,
    Path(application_id): Path<String>,
    axum::Json(submission): axum::Json<DocumentSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: EventNotifier + 'static,
    C: Clock + 'static,
{
    match service.supplement_documents(&ApplicationId(application_id), submission) {
        Ok(record) => {
            let view = ApplicationStatusView::from_application(&record);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &ApplicationServiceError) -> StatusCode {
    match err {
        ApplicationServiceError::Workflow(
            WorkflowError::InvalidTransition { .. }
            | WorkflowError::TerminalState { .. }
            | WorkflowError::InvalidStateForUpload { .. },
        ) => StatusCode::CONFLICT,
        ApplicationServiceError::Workflow(
            WorkflowError::MissingNote { .. } | WorkflowError::DocumentLimitExceeded { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::UnknownState(_) => StatusCode::BAD_REQUEST,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::VersionConflict { .. }) => {
            StatusCode::PRECONDITION_FAILED
        }
        ApplicationServiceError::CorruptedRecord(_)
        | ApplicationServiceError::Repository(_)
        | ApplicationServiceError::Notifier(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: ApplicationServiceError) -> Response {
    let payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    (status_for(&err), axum::Json(payload)).into_response()
}
