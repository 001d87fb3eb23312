use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a persisted match, from ranking through hiring decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Viewed,
    Contacted,
    Shortlisted,
    Interviewing,
    Rejected,
    Hired,
}

impl MatchStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Viewed => "viewed",
            Self::Contacted => "contacted",
            Self::Shortlisted => "shortlisted",
            Self::Interviewing => "interviewing",
            Self::Rejected => "rejected",
            Self::Hired => "hired",
        }
    }

    /// Statuses reachable in a single step.
    pub const fn successors(self) -> &'static [MatchStatus] {
        match self {
            Self::Matched => &[Self::Viewed],
            Self::Viewed => &[Self::Contacted],
            Self::Contacted => &[Self::Shortlisted, Self::Rejected, Self::Hired],
            Self::Shortlisted => &[Self::Interviewing, Self::Rejected, Self::Hired],
            Self::Interviewing => &[Self::Rejected, Self::Hired],
            Self::Rejected | Self::Hired => &[],
        }
    }

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        self.successors().contains(&next)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Hired)
    }

    /// An employer has acted on the match beyond the initial ranking.
    pub const fn is_advanced(self) -> bool {
        !matches!(self, Self::Matched)
    }
}

/// Who requested a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn employer(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Employer,
        }
    }

    pub fn system() -> Self {
        Self {
            id: "system".to_string(),
            role: ActorRole::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Employer,
    Admin,
    System,
}

/// Audit entry appended for every accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: MatchStatus,
    pub to: MatchStatus,
    pub actor: Actor,
    pub at: DateTime<Utc>,
}
