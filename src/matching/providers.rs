use std::sync::Arc;

use super::domain::{
    CandidateId, CandidateSkillEntry, JobFilters, JobId, JobPosting, JobSkillRequirement,
    ProfileFactors,
};

/// Read-only source of a candidate's skill scores.
pub trait SkillProfileProvider: Send + Sync {
    fn candidate_skill_scores(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<CandidateSkillEntry>, ProviderError>;
}

/// Read-only source of candidate profile attributes and the visible candidate pool.
pub trait ProfileFactorProvider: Send + Sync {
    fn candidate_profile_factors(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<ProfileFactors, ProviderError>;

    /// Candidates whose visibility settings allow employer matching.
    fn eligible_candidates(&self) -> Result<Vec<CandidateId>, ProviderError>;
}

/// Read-only source of job postings and their skill requirements.
pub trait JobRequirementProvider: Send + Sync {
    fn job(&self, job_id: &JobId) -> Result<Option<JobPosting>, ProviderError>;

    fn job_requirements(&self, job_id: &JobId) -> Result<Vec<JobSkillRequirement>, ProviderError>;

    fn active_jobs(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, ProviderError>;
}

/// Errors surfaced by external data collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("skill data unavailable: {0}")]
    SkillDataUnavailable(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Collaborators injected into the matching service at process start.
#[derive(Clone)]
pub struct MatchingProviders {
    pub skills: Arc<dyn SkillProfileProvider>,
    pub profiles: Arc<dyn ProfileFactorProvider>,
    pub jobs: Arc<dyn JobRequirementProvider>,
}

impl MatchingProviders {
    /// Wire all three seams to a single backing directory.
    pub fn from_directory<D>(directory: Arc<D>) -> Self
    where
        D: SkillProfileProvider + ProfileFactorProvider + JobRequirementProvider + 'static,
    {
        Self {
            skills: directory.clone(),
            profiles: directory.clone(),
            jobs: directory,
        }
    }
}
