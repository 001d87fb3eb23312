use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::matching::domain::{
    CandidateId, CandidateSkillEntry, CandidateSnapshot, JobFilters, JobId, JobPosting,
    JobSkillRequirement, JobSnapshot, JobStatus, LocationType, ProfileFactors, SkillId,
    SkillSource,
};
use crate::matching::providers::{
    JobRequirementProvider, MatchingProviders, ProfileFactorProvider, ProviderError,
    SkillProfileProvider,
};
use crate::matching::ranking::{JobContext, ScoredMatch};
use crate::matching::scoring::{BonusBreakdown, MatchScore, ScoringConfig, SkillBreakdown};
use crate::matching::service::{BatchSettings, MatchingService};
use crate::matching::store::InMemoryMatchStore;

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn skill(id: &str, score: f64) -> CandidateSkillEntry {
    CandidateSkillEntry {
        skill_id: SkillId::new(id),
        score,
        source: SkillSource::Interview,
        expires_at: None,
    }
}

pub(super) fn requirement(
    id: &str,
    weight: f64,
    minimum_score: f64,
    required: bool,
) -> JobSkillRequirement {
    JobSkillRequirement {
        skill_id: SkillId::new(id),
        skill_name: id.to_ascii_uppercase(),
        weight,
        minimum_score,
        required,
    }
}

/// Onsite posting with no city, level, or description, so no profile bonus applies.
pub(super) fn posting(id: &str) -> JobPosting {
    JobPosting {
        job_id: JobId::new(id),
        title: "Data Engineer".to_string(),
        description: String::new(),
        experience_level: None,
        location_type: LocationType::Onsite,
        city: None,
        state: None,
        status: JobStatus::Active,
        posted_at: at(2026, 9, 1),
    }
}

/// Python (0.6, min 70) and SQL (0.4, min 60), both required.
pub(super) fn data_requirements() -> Vec<JobSkillRequirement> {
    vec![
        requirement("python", 0.6, 70.0, true),
        requirement("sql", 0.4, 60.0, true),
    ]
}

pub(super) fn data_job() -> JobSnapshot {
    JobSnapshot {
        job: posting("job-data"),
        requirements: data_requirements(),
    }
}

pub(super) fn candidate(id: &str, skills: Vec<CandidateSkillEntry>) -> CandidateSnapshot {
    CandidateSnapshot {
        candidate_id: CandidateId::new(id),
        skills,
        factors: ProfileFactors::default(),
    }
}

pub(super) fn scored(
    candidate_id: &str,
    job_id: &str,
    overall_score: f64,
    qualified: bool,
) -> ScoredMatch {
    ScoredMatch {
        job: JobContext {
            title: format!("Job {job_id}"),
            location_type: LocationType::Remote,
            posted_at: at(2026, 9, 1),
        },
        score: MatchScore {
            candidate_id: CandidateId::new(candidate_id),
            job_id: JobId::new(job_id),
            base_skill_score: overall_score,
            skill_cap: None,
            skill_score: overall_score,
            bonus_points: 0.0,
            bonus: BonusBreakdown::default(),
            overall_score,
            required_skills_met: u32::from(qualified),
            total_required_skills: 1,
            qualified,
            skill_breakdown: SkillBreakdown::default(),
        },
    }
}

#[derive(Debug, Clone)]
struct StoredCandidate {
    factors: ProfileFactors,
    skills: Vec<CandidateSkillEntry>,
    visible: bool,
}

/// Provider fake backing all three seams, with per-candidate failure injection.
#[derive(Default)]
pub(super) struct MemoryDirectory {
    candidates: Mutex<HashMap<CandidateId, StoredCandidate>>,
    jobs: Mutex<HashMap<JobId, JobSnapshot>>,
    skill_outages: Mutex<HashSet<CandidateId>>,
    profile_outages: Mutex<HashSet<CandidateId>>,
    eligible_delay: Mutex<Option<Duration>>,
}

impl MemoryDirectory {
    pub(super) fn with_job(job: JobSnapshot) -> Arc<Self> {
        let directory = Arc::new(Self::default());
        directory.put_job(job);
        directory
    }

    pub(super) fn put_job(&self, job: JobSnapshot) {
        self.jobs
            .lock()
            .expect("jobs mutex poisoned")
            .insert(job.job.job_id.clone(), job);
    }

    pub(super) fn set_job_status(&self, job_id: &str, status: JobStatus) {
        let mut jobs = self.jobs.lock().expect("jobs mutex poisoned");
        if let Some(job) = jobs.get_mut(&JobId::new(job_id)) {
            job.job.status = status;
        }
    }

    pub(super) fn put_candidate(&self, snapshot: CandidateSnapshot) {
        self.candidates.lock().expect("candidates mutex poisoned").insert(
            snapshot.candidate_id.clone(),
            StoredCandidate {
                factors: snapshot.factors,
                skills: snapshot.skills,
                visible: true,
            },
        );
    }

    pub(super) fn hide_candidate(&self, id: &str) {
        let mut candidates = self.candidates.lock().expect("candidates mutex poisoned");
        if let Some(candidate) = candidates.get_mut(&CandidateId::new(id)) {
            candidate.visible = false;
        }
    }

    pub(super) fn set_skills(&self, id: &str, skills: Vec<CandidateSkillEntry>) {
        let mut candidates = self.candidates.lock().expect("candidates mutex poisoned");
        if let Some(candidate) = candidates.get_mut(&CandidateId::new(id)) {
            candidate.skills = skills;
        }
    }

    pub(super) fn fail_skills_for(&self, id: &str) {
        self.skill_outages
            .lock()
            .expect("outage mutex poisoned")
            .insert(CandidateId::new(id));
    }

    pub(super) fn fail_profile_for(&self, id: &str) {
        self.profile_outages
            .lock()
            .expect("outage mutex poisoned")
            .insert(CandidateId::new(id));
    }

    pub(super) fn delay_eligible_listing(&self, delay: Duration) {
        *self.eligible_delay.lock().expect("delay mutex poisoned") = Some(delay);
    }
}

impl SkillProfileProvider for MemoryDirectory {
    fn candidate_skill_scores(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<CandidateSkillEntry>, ProviderError> {
        if self
            .skill_outages
            .lock()
            .expect("outage mutex poisoned")
            .contains(candidate_id)
        {
            return Err(ProviderError::SkillDataUnavailable(candidate_id.to_string()));
        }
        self.candidates
            .lock()
            .expect("candidates mutex poisoned")
            .get(candidate_id)
            .map(|candidate| candidate.skills.clone())
            .ok_or_else(|| ProviderError::NotFound(candidate_id.to_string()))
    }
}

impl ProfileFactorProvider for MemoryDirectory {
    fn candidate_profile_factors(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<ProfileFactors, ProviderError> {
        if self
            .profile_outages
            .lock()
            .expect("outage mutex poisoned")
            .contains(candidate_id)
        {
            return Err(ProviderError::Unavailable(candidate_id.to_string()));
        }
        self.candidates
            .lock()
            .expect("candidates mutex poisoned")
            .get(candidate_id)
            .map(|candidate| candidate.factors.clone())
            .ok_or_else(|| ProviderError::NotFound(candidate_id.to_string()))
    }

    fn eligible_candidates(&self) -> Result<Vec<CandidateId>, ProviderError> {
        let delay = *self.eligible_delay.lock().expect("delay mutex poisoned");
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut ids: Vec<CandidateId> = self
            .candidates
            .lock()
            .expect("candidates mutex poisoned")
            .iter()
            .filter(|(_, candidate)| candidate.visible)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl JobRequirementProvider for MemoryDirectory {
    fn job(&self, job_id: &JobId) -> Result<Option<JobPosting>, ProviderError> {
        Ok(self
            .jobs
            .lock()
            .expect("jobs mutex poisoned")
            .get(job_id)
            .map(|job| job.job.clone()))
    }

    fn job_requirements(&self, job_id: &JobId) -> Result<Vec<JobSkillRequirement>, ProviderError> {
        self.jobs
            .lock()
            .expect("jobs mutex poisoned")
            .get(job_id)
            .map(|job| job.requirements.clone())
            .ok_or_else(|| ProviderError::NotFound(job_id.to_string()))
    }

    fn active_jobs(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, ProviderError> {
        let mut jobs: Vec<JobPosting> = self
            .jobs
            .lock()
            .expect("jobs mutex poisoned")
            .values()
            .map(|job| job.job.clone())
            .filter(|job| job.is_active() && filters.admits(job))
            .collect();
        jobs.sort_by(|left, right| left.job_id.cmp(&right.job_id));
        Ok(jobs)
    }
}

/// Job provider that is always down.
pub(super) struct UnavailableJobs;

impl JobRequirementProvider for UnavailableJobs {
    fn job(&self, _job_id: &JobId) -> Result<Option<JobPosting>, ProviderError> {
        Err(ProviderError::Unavailable("job service offline".to_string()))
    }

    fn job_requirements(&self, _job_id: &JobId) -> Result<Vec<JobSkillRequirement>, ProviderError> {
        Err(ProviderError::Unavailable("job service offline".to_string()))
    }

    fn active_jobs(&self, _filters: &JobFilters) -> Result<Vec<JobPosting>, ProviderError> {
        Err(ProviderError::Unavailable("job service offline".to_string()))
    }
}

pub(super) fn build_service_with(
    directory: Arc<MemoryDirectory>,
    settings: BatchSettings,
) -> (Arc<MatchingService>, Arc<InMemoryMatchStore>) {
    let store = Arc::new(InMemoryMatchStore::default());
    let service = MatchingService::new(
        MatchingProviders::from_directory(directory),
        store.clone(),
        ScoringConfig::default(),
        settings,
    );
    (Arc::new(service), store)
}

pub(super) fn build_service(
    directory: Arc<MemoryDirectory>,
) -> (Arc<MatchingService>, Arc<InMemoryMatchStore>) {
    build_service_with(directory, BatchSettings::default())
}

/// Data job plus three candidates: two qualified (81 and 72) and one missing SQL.
pub(super) fn seeded_directory() -> Arc<MemoryDirectory> {
    let directory = MemoryDirectory::with_job(data_job());
    directory.put_candidate(candidate(
        "cand-a",
        vec![skill("python", 85.0), skill("sql", 75.0)],
    ));
    directory.put_candidate(candidate(
        "cand-b",
        vec![skill("python", 70.0), skill("sql", 75.0)],
    ));
    directory.put_candidate(candidate("cand-c", vec![skill("python", 85.0)]));
    directory
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
