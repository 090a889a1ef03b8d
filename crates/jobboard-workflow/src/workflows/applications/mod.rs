//! Job application lifecycle: state catalog, transition rules, the workflow engine,
//! and the progress projection consumed by candidate and recruiter views.
//!
//! The engine is pure. Persistence and outbound notifications sit behind the
//! [`ApplicationRepository`] and [`EventNotifier`] traits, and the service facade wires
//! them together for request handlers.

pub mod catalog;
pub mod clock;
pub mod domain;
pub mod engine;
pub mod events;
pub mod progress;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use catalog::{ApplicationState, StateCatalog, StateDescriptor, Tone, UnknownStateError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    Application, ApplicationId, ApplicationSubmission, DocumentRef, Milestone, Notification,
    PostRef, ResumeRef,
};
pub use engine::{TransitionOutcome, WorkflowEngine, WorkflowError, WorkflowPolicy};
pub use events::{EventNotifier, NotifierError, WorkflowEvent};
pub use progress::{ProgressProjector, ProgressStatus, ProgressView, StepState, StepView};
pub use repository::{
    decode_stored, ApplicationRepository, ApplicationStatusView, RepositoryError,
};
pub use router::application_router;
pub use service::{
    ApplicationServiceError, ApplicationWorkflowService, DocumentSubmission, TransitionRequest,
};
pub use transitions::{NoteRequirement, TransitionTable};
