use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, TracingNotifier};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard_workflow::config::AppConfig;
use jobboard_workflow::error::AppError;
use jobboard_workflow::telemetry;
use jobboard_workflow::workflows::applications::{ApplicationWorkflowService, SystemClock};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notifier = Arc::new(TracingNotifier::default());
    let application_service = Arc::new(ApplicationWorkflowService::new(
        repository,
        notifier,
        SystemClock,
        config.workflow.clone(),
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        require_request_note = config.workflow.require_request_note,
        max_documents = config.workflow.max_documents,
        "job application workflow service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
