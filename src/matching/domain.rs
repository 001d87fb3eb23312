use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for candidate accounts.
    CandidateId
);
identifier!(
    /// Identifier wrapper for job postings.
    JobId
);
identifier!(
    /// Identifier wrapper for catalogued skills.
    SkillId
);
identifier!(
    /// Identifier wrapper for persisted matches.
    MatchId
);

/// How a candidate's skill score was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Interview,
    Manual,
}

/// Verified or self-declared score for a single skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkillEntry {
    pub skill_id: SkillId,
    pub score: f64,
    pub source: SkillSource,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CandidateSkillEntry {
    /// An entry is current until its expiry instant; entries without an expiry never lapse.
    pub fn is_current(&self, as_of: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > as_of)
    }
}

/// Skill declared by a job posting, with its weight and pass threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSkillRequirement {
    pub skill_id: SkillId,
    #[serde(default)]
    pub skill_name: String,
    pub weight: f64,
    pub minimum_score: f64,
    pub required: bool,
}

/// Seniority band stated by a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Entry,
            Self::Mid,
            Self::Senior,
            Self::Lead,
            Self::Executive,
        ]
    }

    /// Years of experience covered by the band, lower bound inclusive.
    pub const fn band(self) -> (f64, Option<f64>) {
        match self {
            Self::Entry => (0.0, Some(2.0)),
            Self::Mid => (2.0, Some(5.0)),
            Self::Senior => (5.0, Some(10.0)),
            Self::Lead => (10.0, Some(15.0)),
            Self::Executive => (15.0, None),
        }
    }

    pub fn for_years(years: f64) -> Self {
        Self::ordered()
            .into_iter()
            .find(|level| {
                let (lower, upper) = level.band();
                years >= lower && upper.map_or(true, |upper| years < upper)
            })
            .unwrap_or(Self::Entry)
    }

    fn position(self) -> usize {
        self as usize
    }

    pub fn is_adjacent(self, other: Self) -> bool {
        self.position().abs_diff(other.position()) == 1
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Executive => "executive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Remote,
    Hybrid,
    Onsite,
}

impl LocationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
            Self::Onsite => "onsite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

/// Posting attributes the engine reads; everything else stays with the job service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    pub location_type: LocationType,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub status: JobStatus,
    pub posted_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }
}

/// Filters forwarded to the job provider when listing active postings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFilters {
    #[serde(default)]
    pub location_type: Option<LocationType>,
}

impl JobFilters {
    pub fn admits(&self, job: &JobPosting) -> bool {
        self.location_type
            .map_or(true, |location_type| job.location_type == location_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
}

/// Profile attributes feeding the affinity bonuses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFactors {
    #[serde(default)]
    pub years_experience: f64,
    #[serde(default)]
    pub preferred_location_type: Option<LocationType>,
    #[serde(default)]
    pub willing_to_relocate: bool,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub work_history: Vec<WorkHistoryEntry>,
}

/// Candidate inputs captured once per batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub candidate_id: CandidateId,
    pub skills: Vec<CandidateSkillEntry>,
    pub factors: ProfileFactors,
}

/// Job inputs captured once per batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job: JobPosting,
    pub requirements: Vec<JobSkillRequirement>,
}
