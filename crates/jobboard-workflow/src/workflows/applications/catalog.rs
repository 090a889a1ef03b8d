use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle states an application can occupy. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ApplicationState {
    Submitted,
    Reviewing,
    Requested,
    Interview,
    Accepted,
    Hired,
    Rejected,
}

impl ApplicationState {
    pub const ALL: [Self; 7] = [
        Self::Submitted,
        Self::Reviewing,
        Self::Requested,
        Self::Interview,
        Self::Accepted,
        Self::Hired,
        Self::Rejected,
    ];

    /// Storage and wire code for the state.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Reviewing => "REVIEWING",
            Self::Requested => "REQUESTED",
            Self::Interview => "INTERVIEW",
            Self::Accepted => "ACCEPTED",
            Self::Hired => "HIRED",
            Self::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Parses a stored or requested state code. Unknown values are an error, never a default.
    pub fn parse(raw: &str) -> Result<Self, UnknownStateError> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.code().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnknownStateError {
                value: raw.to_string(),
            })
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ApplicationState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decoding goes through [`ApplicationState::parse`], so stored rows and requests agree.
impl TryFrom<String> for ApplicationState {
    type Error = UnknownStateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// A state value outside the enumerated set, usually data corruption or schema drift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application state '{value}'")]
pub struct UnknownStateError {
    pub value: String,
}

/// Severity class used to colour badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Info,
    Warning,
    Success,
    Danger,
}

impl Tone {
    pub const fn class(self) -> &'static str {
        match self {
            Tone::Neutral => "badge-neutral",
            Tone::Info => "badge-info",
            Tone::Warning => "badge-warning",
            Tone::Success => "badge-success",
            Tone::Danger => "badge-danger",
        }
    }
}

/// Human-facing metadata for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateDescriptor {
    pub state: ApplicationState,
    pub label: &'static str,
    pub icon: &'static str,
    pub tone: Tone,
}

/// Single registry of display metadata for every application state.
pub struct StateCatalog;

impl StateCatalog {
    const FALLBACK_LABEL: &'static str = "Không xác định";

    pub const fn describe(state: ApplicationState) -> StateDescriptor {
        let (label, icon, tone) = match state {
            ApplicationState::Submitted => ("Đã nộp", "paper-plane", Tone::Neutral),
            ApplicationState::Reviewing => ("Đang xét duyệt", "magnifier", Tone::Info),
            ApplicationState::Requested => ("Yêu cầu bổ sung", "file-plus", Tone::Warning),
            ApplicationState::Accepted => ("Đạt vòng hồ sơ", "check-circle", Tone::Success),
            ApplicationState::Interview => ("Phỏng vấn", "calendar", Tone::Info),
            ApplicationState::Hired => ("Đã tuyển", "trophy", Tone::Success),
            ApplicationState::Rejected => ("Từ chối", "x-circle", Tone::Danger),
        };

        StateDescriptor {
            state,
            label,
            icon,
            tone,
        }
    }

    /// Describes a raw stored value, surfacing unknown codes instead of masking them.
    pub fn describe_raw(raw: &str) -> Result<StateDescriptor, UnknownStateError> {
        ApplicationState::parse(raw).map(Self::describe)
    }

    /// Cosmetic label for display only, after an [`UnknownStateError`] has been reported.
    pub const fn fallback_label() -> &'static str {
        Self::FALLBACK_LABEL
    }

    /// Title of the candidate notification emitted when a note accompanies a transition.
    pub fn notification_title(state: ApplicationState) -> String {
        format!(
            "Hồ sơ ứng tuyển chuyển sang: {}",
            Self::describe(state).label
        )
    }
}
