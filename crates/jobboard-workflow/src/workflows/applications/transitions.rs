use serde::Serialize;

use super::catalog::ApplicationState;

/// Whether a transition must carry a note for the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteRequirement {
    Optional,
    Required,
}

/// Authoritative map of permissible moves between application states.
pub struct TransitionTable;

impl TransitionTable {
    pub const fn allowed_from(from: ApplicationState) -> &'static [ApplicationState] {
        use ApplicationState::*;

        match from {
            Submitted => &[Reviewing, Requested, Rejected],
            Reviewing => &[Accepted, Requested, Rejected],
            Requested => &[Reviewing, Rejected],
            Accepted => &[Interview, Requested, Rejected],
            Interview => &[Hired, Rejected],
            Hired | Rejected => &[],
        }
    }

    pub fn is_allowed(from: ApplicationState, to: ApplicationState) -> bool {
        Self::allowed_from(from).contains(&to)
    }

    /// Side data demanded when entering `to`. Asking for documents needs the list of
    /// what to supplement.
    pub const fn requirement(to: ApplicationState) -> NoteRequirement {
        match to {
            ApplicationState::Requested => NoteRequirement::Required,
            _ => NoteRequirement::Optional,
        }
    }
}
