//! Four-step progress bar projection shown to candidates and recruiters.
//!
//! The projection is derived from a snapshot and never feeds back into the workflow.
//! Rules are checked in a fixed order and the first match wins, so a record carrying
//! several milestones always lands on the same step.

use serde::Serialize;

use super::catalog::ApplicationState;
use super::domain::Application;

pub const STEP_LABELS: [&str; 4] = ["Nộp hồ sơ", "Xét duyệt", "Phỏng vấn", "Kết quả"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Submitted,
    Reviewing,
    Requested,
    Accepted,
    Interview,
    Hired,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Done,
    Current,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub index: u8,
    pub label: &'static str,
    pub state: StepState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    /// 1-based position on the four-step bar.
    pub step: u8,
    pub status: ProgressStatus,
    pub is_rejected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at_step: Option<u8>,
    pub steps: Vec<StepView>,
}

pub struct ProgressProjector;

impl ProgressProjector {
    pub fn project(application: &Application) -> ProgressView {
        let (step, status) = Self::locate(application);
        let is_rejected = status == ProgressStatus::Rejected;
        let rejected_at_step = is_rejected.then_some(step);

        ProgressView {
            step,
            status,
            is_rejected,
            rejected_at_step,
            steps: Self::steps(step, is_rejected, status == ProgressStatus::Hired),
        }
    }

    fn locate(application: &Application) -> (u8, ProgressStatus) {
        let state = application.state;

        if state == ApplicationState::Rejected || application.rejected_at.is_some() {
            let step = if application.accepted_at.is_some() { 4 } else { 2 };
            (step, ProgressStatus::Rejected)
        } else if state == ApplicationState::Hired || application.hired_at.is_some() {
            (4, ProgressStatus::Hired)
        } else if state == ApplicationState::Interview || application.interview_at.is_some() {
            (3, ProgressStatus::Interview)
        } else if state == ApplicationState::Accepted || application.accepted_at.is_some() {
            (3, ProgressStatus::Accepted)
        } else if state == ApplicationState::Requested || application.requested_at.is_some() {
            (2, ProgressStatus::Requested)
        } else if state == ApplicationState::Reviewing {
            (2, ProgressStatus::Reviewing)
        } else {
            (1, ProgressStatus::Submitted)
        }
    }

    fn steps(current: u8, rejected: bool, hired: bool) -> Vec<StepView> {
        STEP_LABELS
            .into_iter()
            .zip(1u8..)
            .map(|(label, index)| {
                let state = if index < current || (index == current && hired) {
                    StepState::Done
                } else if index == current && rejected {
                    StepState::Failed
                } else if index == current {
                    StepState::Current
                } else {
                    StepState::Pending
                };
                StepView {
                    index,
                    label,
                    state,
                }
            })
            .collect()
    }
}
