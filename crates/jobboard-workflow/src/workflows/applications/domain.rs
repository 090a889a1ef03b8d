use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ApplicationState;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Reference to the candidate's resume. The candidate owns it; applications borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeRef(pub String);

/// Reference to the recruiter's job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef(pub String);

/// Supplementary file handed in while the recruiter is requesting documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub storage_key: String,
}

/// Workflow message surfaced to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Candidate input needed to open a new application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub resume_ref: ResumeRef,
    pub post_ref: PostRef,
}

/// One candidate's submission to one job posting.
///
/// Milestone timestamps are written once, the first time the application enters the
/// matching state, and never cleared. `documents` and `notifications` only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub state: ApplicationState,
    /// Incremented on every accepted mutation; writers compare it before persisting.
    pub version: u64,
    pub applied_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub requested_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub interview_at: Option<DateTime<Utc>>,
    pub hired_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub resume_ref: ResumeRef,
    pub post_ref: PostRef,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Application {
    pub fn submit(id: ApplicationId, submission: ApplicationSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            state: ApplicationState::Submitted,
            version: 0,
            applied_at: Some(now),
            reviewed_at: None,
            requested_at: None,
            accepted_at: None,
            interview_at: None,
            hired_at: None,
            rejected_at: None,
            resume_ref: submission.resume_ref,
            post_ref: submission.post_ref,
            documents: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn milestone(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        match milestone {
            Milestone::Applied => self.applied_at,
            Milestone::Reviewed => self.reviewed_at,
            Milestone::Requested => self.requested_at,
            Milestone::Accepted => self.accepted_at,
            Milestone::Interview => self.interview_at,
            Milestone::Hired => self.hired_at,
            Milestone::Rejected => self.rejected_at,
        }
    }

    /// Stamps the milestone unless it already holds a value. Returns whether it was written.
    pub(crate) fn stamp(&mut self, milestone: Milestone, at: DateTime<Utc>) -> bool {
        let slot = match milestone {
            Milestone::Applied => &mut self.applied_at,
            Milestone::Reviewed => &mut self.reviewed_at,
            Milestone::Requested => &mut self.requested_at,
            Milestone::Accepted => &mut self.accepted_at,
            Milestone::Interview => &mut self.interview_at,
            Milestone::Hired => &mut self.hired_at,
            Milestone::Rejected => &mut self.rejected_at,
        };

        if slot.is_some() {
            return false;
        }
        *slot = Some(at);
        true
    }
}

/// Timestamp slots recording when an application first reached a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Applied,
    Reviewed,
    Requested,
    Accepted,
    Interview,
    Hired,
    Rejected,
}

impl Milestone {
    pub const fn for_state(state: ApplicationState) -> Self {
        match state {
            ApplicationState::Submitted => Self::Applied,
            ApplicationState::Reviewing => Self::Reviewed,
            ApplicationState::Requested => Self::Requested,
            ApplicationState::Accepted => Self::Accepted,
            ApplicationState::Interview => Self::Interview,
            ApplicationState::Hired => Self::Hired,
            ApplicationState::Rejected => Self::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn submission() -> ApplicationSubmission {
        ApplicationSubmission {
            resume_ref: ResumeRef("resume-7".to_string()),
            post_ref: PostRef("post-42".to_string()),
        }
    }

    #[test]
    fn submit_opens_in_submitted_with_applied_at() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let app = Application::submit(ApplicationId("app-1".to_string()), submission(), now);

        assert_eq!(app.state, ApplicationState::Submitted);
        assert_eq!(app.applied_at, Some(now));
        assert_eq!(app.version, 0);
        for milestone in [
            Milestone::Reviewed,
            Milestone::Requested,
            Milestone::Accepted,
            Milestone::Interview,
            Milestone::Hired,
            Milestone::Rejected,
        ] {
            assert!(app.milestone(milestone).is_none(), "{milestone:?} set");
        }
    }

    #[test]
    fn stamp_keeps_first_value() {
        let first = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap();
        let mut app = Application::submit(ApplicationId("app-2".to_string()), submission(), first);

        assert!(app.stamp(Milestone::Requested, first));
        assert!(!app.stamp(Milestone::Requested, later));
        assert_eq!(app.requested_at, Some(first));
    }
}
