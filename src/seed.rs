//! JSON-backed provider directory used by the binary and by integration tests.
//!
//! A seed file lists candidates (profile factors plus skill entries) and jobs (posting plus
//! requirements). The directory answers all three provider seams from that single document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matching::{
    CandidateId, CandidateSkillEntry, JobFilters, JobId, JobPosting, JobRequirementProvider,
    JobSkillRequirement, ProfileFactorProvider, ProfileFactors, ProviderError,
    SkillProfileProvider,
};

const SAMPLE_SEED: &str = include_str!("../data/sample_seed.json");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCandidate {
    pub candidate_id: CandidateId,
    #[serde(default)]
    pub visibility: ProfileVisibility,
    #[serde(default)]
    pub factors: ProfileFactors,
    #[serde(default)]
    pub skills: Vec<CandidateSkillEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedJob {
    pub posting: JobPosting,
    #[serde(default)]
    pub requirements: Vec<JobSkillRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub candidates: Vec<SeedCandidate>,
    #[serde(default)]
    pub jobs: Vec<SeedJob>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("seed document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("candidate {0} appears more than once")]
    DuplicateCandidate(CandidateId),
    #[error("job {0} appears more than once")]
    DuplicateJob(JobId),
}

/// Read-only directory answering the skill, profile, and job provider seams.
#[derive(Debug, Default)]
pub struct SeedDirectory {
    candidates: HashMap<CandidateId, SeedCandidate>,
    jobs: HashMap<JobId, SeedJob>,
}

impl SeedDirectory {
    pub fn from_document(document: SeedDocument) -> Result<Self, SeedError> {
        let mut candidates = HashMap::with_capacity(document.candidates.len());
        for candidate in document.candidates {
            let candidate_id = candidate.candidate_id.clone();
            if candidates.insert(candidate_id.clone(), candidate).is_some() {
                return Err(SeedError::DuplicateCandidate(candidate_id));
            }
        }

        let mut jobs = HashMap::with_capacity(document.jobs.len());
        for job in document.jobs {
            let job_id = job.posting.job_id.clone();
            if jobs.insert(job_id.clone(), job).is_some() {
                return Err(SeedError::DuplicateJob(job_id));
            }
        }

        Ok(Self { candidates, jobs })
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Self::from_document(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Small bundled dataset for demos and local runs.
    pub fn sample() -> Result<Self, SeedError> {
        Self::from_json(SAMPLE_SEED)
    }

    /// Load from `path` when given, otherwise fall back to the bundled sample.
    pub fn load(path: Option<&Path>) -> Result<Self, SeedError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::sample(),
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

impl SkillProfileProvider for SeedDirectory {
    fn candidate_skill_scores(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<CandidateSkillEntry>, ProviderError> {
        self.candidates
            .get(candidate_id)
            .map(|candidate| candidate.skills.clone())
            .ok_or_else(|| ProviderError::NotFound(candidate_id.to_string()))
    }
}

impl ProfileFactorProvider for SeedDirectory {
    fn candidate_profile_factors(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<ProfileFactors, ProviderError> {
        self.candidates
            .get(candidate_id)
            .map(|candidate| candidate.factors.clone())
            .ok_or_else(|| ProviderError::NotFound(candidate_id.to_string()))
    }

    fn eligible_candidates(&self) -> Result<Vec<CandidateId>, ProviderError> {
        let mut eligible: Vec<CandidateId> = self
            .candidates
            .values()
            .filter(|candidate| candidate.visibility == ProfileVisibility::Public)
            .map(|candidate| candidate.candidate_id.clone())
            .collect();
        eligible.sort();
        Ok(eligible)
    }
}

impl JobRequirementProvider for SeedDirectory {
    fn job(&self, job_id: &JobId) -> Result<Option<JobPosting>, ProviderError> {
        Ok(self.jobs.get(job_id).map(|job| job.posting.clone()))
    }

    fn job_requirements(&self, job_id: &JobId) -> Result<Vec<JobSkillRequirement>, ProviderError> {
        self.jobs
            .get(job_id)
            .map(|job| job.requirements.clone())
            .ok_or_else(|| ProviderError::NotFound(job_id.to_string()))
    }

    fn active_jobs(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, ProviderError> {
        let mut jobs: Vec<JobPosting> = self
            .jobs
            .values()
            .map(|job| &job.posting)
            .filter(|posting| posting.is_active() && filters.admits(posting))
            .cloned()
            .collect();
        jobs.sort_by(|left, right| left.job_id.cmp(&right.job_id));
        Ok(jobs)
    }
}
