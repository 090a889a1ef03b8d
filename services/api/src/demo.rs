use crate::infra::{InMemoryApplicationRepository, TracingNotifier};
use chrono::Duration;
use clap::Args;
use jobboard_workflow::error::AppError;
use jobboard_workflow::workflows::applications::{
    Application, ApplicationState, ApplicationStatusView, ApplicationSubmission,
    ApplicationWorkflowService, DocumentRef, DocumentSubmission, ManualClock, PostRef,
    ProgressView, ResumeRef, StepState, TransitionRequest, WorkflowEvent, WorkflowPolicy,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Comma separated target states to walk through, in order.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "REVIEWING,REQUESTED,REVIEWING,ACCEPTED,INTERVIEW,HIRED"
    )]
    pub(crate) path: Vec<String>,
    /// Resume reference for the demo candidate.
    #[arg(long, default_value = "resume-demo")]
    pub(crate) resume: String,
    /// Job posting reference for the demo application.
    #[arg(long, default_value = "post-demo")]
    pub(crate) post: String,
    /// Print dispatched workflow events after the walk.
    #[arg(long)]
    pub(crate) show_events: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        path,
        resume,
        post,
        show_events,
    } = args;

    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let notifier = Arc::new(TracingNotifier::default());
    let service = ApplicationWorkflowService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        notifier.clone(),
        clock.clone(),
        WorkflowPolicy::default(),
    );

    println!("Job application workflow demo");
    let mut application = service.submit(ApplicationSubmission {
        resume_ref: ResumeRef(resume),
        post_ref: PostRef(post),
    })?;
    render_step("submitted", &application);

    for target in path {
        clock.advance(Duration::days(1));
        let request = TransitionRequest {
            note: Some(demo_note(&target)),
            target,
            expected_version: Some(application.version),
        };
        application = service.transition(&application.id, request)?.application;
        render_step("transitioned", &application);

        if application.state == ApplicationState::Requested {
            application = service.supplement_documents(
                &application.id,
                DocumentSubmission {
                    files: vec![DocumentRef {
                        name: "Bản sao bằng cấp".to_string(),
                        storage_key: format!("uploads/{}/degree.pdf", application.id.0),
                    }],
                },
            )?;
            println!("  candidate supplemented {} document(s)", application.documents.len());
        }
    }

    println!("\nNotifications sent to the candidate");
    for notification in &application.notifications {
        println!("- {}: {}", notification.title, notification.content);
    }

    if show_events {
        println!("\nDispatched events");
        for event in notifier.events() {
            println!("- {}", describe_event(&event));
        }
    }

    Ok(())
}

fn demo_note(target: &str) -> String {
    format!("Cập nhật trạng thái: {}", target.trim().to_ascii_uppercase())
}

fn render_step(action: &str, application: &Application) {
    let view = ApplicationStatusView::from_application(application);
    println!(
        "\n[{}] {} -> {} [{}] (v{})",
        action,
        view.application_id.0,
        view.label,
        view.tone.class(),
        view.version
    );
    println!("  progress: {}", render_progress(&view.progress));
    let next: Vec<_> = view
        .allowed_transitions
        .iter()
        .map(|state| state.code())
        .collect();
    if next.is_empty() {
        println!("  closed: no further transitions");
    } else {
        println!("  next: {}", next.join(", "));
    }
}

fn render_progress(progress: &ProgressView) -> String {
    progress
        .steps
        .iter()
        .map(|step| {
            let marker = match step.state {
                StepState::Done => "x",
                StepState::Current => ">",
                StepState::Pending => " ",
                StepState::Failed => "!",
            };
            format!("[{marker}] {}", step.label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn describe_event(event: &WorkflowEvent) -> String {
    match event {
        WorkflowEvent::ApplicationTransitioned { from, to, at, .. } => {
            format!("{at}: {from} -> {to}")
        }
        WorkflowEvent::NotificationAppended { title, at, .. } => {
            format!("{at}: notify \"{title}\"")
        }
        WorkflowEvent::DocumentsSupplemented { count, at, .. } => {
            format!("{at}: {count} document(s) supplemented")
        }
    }
}
