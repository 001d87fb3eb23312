//! Candidate/job matching: pure scoring, ranking, batch orchestration, and the persisted
//! match lifecycle.
//!
//! All I/O goes through the provider traits and the [`MatchStore`]; the scoring engine only
//! ever sees snapshots, so it can be exercised without any backing database.

pub mod domain;
mod pool;
pub mod providers;
pub mod ranking;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateId, CandidateSkillEntry, CandidateSnapshot, Education, ExperienceLevel, JobFilters,
    JobId, JobPosting, JobSkillRequirement, JobSnapshot, JobStatus, LocationType, MatchId,
    ProfileFactors, SkillId, SkillSource, WorkHistoryEntry,
};
pub use providers::{
    JobRequirementProvider, MatchingProviders, ProfileFactorProvider, ProviderError,
    SkillProfileProvider,
};
pub use ranking::{rank, BrowseFilters, BrowseSort, JobContext, RankMode, RankedMatch, ScoredMatch};
pub use router::matching_router;
pub use scoring::{
    BonusBreakdown, MatchScore, ScoringConfig, ScoringEngine, SkillAssessment, SkillBreakdown,
    SkillPresence,
};
pub use service::{BatchOutcome, BatchSettings, MatchingError, MatchingService};
pub use status::{Actor, ActorRole, MatchStatus, StatusChange};
pub use store::{InMemoryMatchStore, Match, MatchStore, StoreError};
pub use validation::ValidationError;
