use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::domain::{
    CandidateId, CandidateSnapshot, JobFilters, JobId, JobPosting, JobSnapshot, JobStatus,
    MatchId,
};
use super::pool::run_bounded;
use super::providers::{MatchingProviders, ProviderError};
use super::ranking::{rank, BrowseFilters, JobContext, RankMode, RankedMatch, ScoredMatch};
use super::scoring::{MatchScore, ScoringConfig, ScoringEngine};
use super::status::{Actor, MatchStatus, StatusChange};
use super::store::{rank_order, Match, MatchStore, StoreError};
use super::validation::{validate_candidate, validate_job, ValidationError};

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
// Each lost race means the match moved forward, so the lifecycle length bounds the retries.
const MAX_STATUS_ATTEMPTS: usize = 8;

static MATCH_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_match_id() -> MatchId {
    let id = MATCH_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MatchId(format!("match-{id:06}"))
}

/// Worker pool sizing and the caller-visible deadline for batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub workers: usize,
    pub timeout: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Result of a job-triggered recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub match_count: usize,
    pub skipped_count: usize,
    /// Advanced matches kept unranked because the candidate no longer qualifies.
    pub retained_count: usize,
}

/// Orchestrates snapshots, scoring, ranking, and match persistence.
pub struct MatchingService {
    providers: MatchingProviders,
    store: Arc<dyn MatchStore>,
    engine: Arc<ScoringEngine>,
    settings: BatchSettings,
}

impl MatchingService {
    pub fn new(
        providers: MatchingProviders,
        store: Arc<dyn MatchStore>,
        scoring: ScoringConfig,
        settings: BatchSettings,
    ) -> Self {
        Self {
            providers,
            store,
            engine: Arc::new(ScoringEngine::new(scoring)),
            settings,
        }
    }

    pub fn settings(&self) -> BatchSettings {
        self.settings
    }

    /// Score a single candidate against a single active job.
    pub fn compute_match(
        &self,
        candidate_id: &CandidateId,
        job_id: &JobId,
    ) -> Result<MatchScore, MatchingError> {
        let job = match self.providers.jobs.job(job_id)? {
            Some(job) if job.is_active() => job,
            _ => return Err(MatchingError::JobNotFound(job_id.clone())),
        };
        let job = job_snapshot(&self.providers, job)?;
        let candidate = candidate_snapshot(&self.providers, candidate_id)?;

        Ok(self.engine.compute(&candidate, &job, Utc::now()))
    }

    /// Rebuild the persisted strict ranking for a job.
    #[instrument(skip_all, fields(job_id = %job_id))]
    pub async fn calculate_job_matches(
        &self,
        job_id: &JobId,
    ) -> Result<BatchOutcome, MatchingError> {
        let job = self
            .providers
            .jobs
            .job(job_id)?
            .ok_or_else(|| MatchingError::JobNotFound(job_id.clone()))?;
        if !job.is_active() {
            return Err(MatchingError::JobNotActive {
                job_id: job_id.clone(),
                status: job.status,
            });
        }

        let job = Arc::new(job_snapshot(&self.providers, job)?);
        let as_of = Utc::now();
        info!(requirements = job.requirements.len(), "calculating job matches");

        let (scores, skipped_count) = tokio::time::timeout(
            self.settings.timeout,
            self.score_candidates(Arc::clone(&job), as_of),
        )
        .await
        .map_err(|_| MatchingError::Timeout(self.settings.timeout))??;

        let context = JobContext::from(&job.job);
        let mut fresh: HashMap<CandidateId, MatchScore> = HashMap::new();
        let entries = scores
            .into_iter()
            .map(|score| {
                fresh.insert(score.candidate_id.clone(), score.clone());
                ScoredMatch {
                    job: context.clone(),
                    score,
                }
            })
            .collect();
        let ranked = rank(entries, &RankMode::Strict);
        let match_count = ranked.len();

        // Status writes racing this rerun either land before the merge reads the rows or
        // after the new set is persisted; neither is lost.
        let merged = self.store.merge_for_job(job_id, &|existing| {
            merge_recalculated(job_id, existing, &ranked, &fresh, as_of)
        })?;
        let retained_count = merged.iter().filter(|record| !record.is_ranked()).count();

        info!(
            match_count,
            skipped_count, retained_count, "job matches replaced"
        );

        Ok(BatchOutcome {
            match_count,
            skipped_count,
            retained_count,
        })
    }

    async fn score_candidates(
        &self,
        job: Arc<JobSnapshot>,
        as_of: DateTime<Utc>,
    ) -> Result<(Vec<MatchScore>, usize), MatchingError> {
        let providers = self.providers.clone();
        let (snapshots, skipped) =
            tokio::task::spawn_blocking(move || snapshot_eligible_candidates(&providers))
                .await
                .map_err(|err| MatchingError::Worker(err.to_string()))??;

        let engine = Arc::clone(&self.engine);
        let scores = run_bounded(snapshots, self.settings.workers, move |candidate| {
            engine.compute(candidate, &job, as_of)
        })
        .await
        .map_err(|err| MatchingError::Worker(err.to_string()))?;

        Ok((scores, skipped))
    }

    /// Persisted strict ranking for a job; retained unranked matches follow the ranked ones.
    pub fn get_job_candidates(&self, job_id: &JobId) -> Result<Vec<Match>, MatchingError> {
        if self.providers.jobs.job(job_id)?.is_none() {
            return Err(MatchingError::JobNotFound(job_id.clone()));
        }
        Ok(self.store.for_job(job_id)?)
    }

    /// Transient exploratory scoring of every active job for one candidate.
    #[instrument(skip_all, fields(candidate_id = %candidate_id))]
    pub async fn browse_jobs_for_candidate(
        &self,
        candidate_id: &CandidateId,
        filters: &BrowseFilters,
    ) -> Result<Vec<RankedMatch>, MatchingError> {
        let candidate = Arc::new(candidate_snapshot(&self.providers, candidate_id)?);
        let as_of = Utc::now();

        let scored = tokio::time::timeout(
            self.settings.timeout,
            self.score_jobs(candidate, filters, as_of),
        )
        .await
        .map_err(|_| MatchingError::Timeout(self.settings.timeout))??;

        let ranked = rank(scored, &RankMode::Exploratory(filters.clone()));
        debug!(results = ranked.len(), "browse results ranked");
        Ok(ranked)
    }

    async fn score_jobs(
        &self,
        candidate: Arc<CandidateSnapshot>,
        filters: &BrowseFilters,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<ScoredMatch>, MatchingError> {
        let providers = self.providers.clone();
        let job_filters = filters.job_filters();
        let jobs = tokio::task::spawn_blocking(move || snapshot_active_jobs(&providers, &job_filters))
            .await
            .map_err(|err| MatchingError::Worker(err.to_string()))??;

        let engine = Arc::clone(&self.engine);
        run_bounded(jobs, self.settings.workers, move |job| ScoredMatch {
            job: JobContext::from(&job.job),
            score: engine.compute(&candidate, job, as_of),
        })
        .await
        .map_err(|err| MatchingError::Worker(err.to_string()))
    }

    /// Move a match forward through its lifecycle.
    pub fn update_match_status(
        &self,
        match_id: &MatchId,
        requested: MatchStatus,
        actor: &Actor,
    ) -> Result<Match, MatchingError> {
        for _ in 0..MAX_STATUS_ATTEMPTS {
            let current = self
                .store
                .fetch(match_id)?
                .ok_or_else(|| MatchingError::MatchNotFound(match_id.clone()))?;

            if !current.status.can_transition_to(requested) {
                warn!(
                    match_id = %match_id,
                    current = current.status.label(),
                    requested = requested.label(),
                    actor = %actor.id,
                    "rejected match status transition"
                );
                return Err(MatchingError::InvalidStatusTransition {
                    match_id: match_id.clone(),
                    current: current.status,
                    requested,
                });
            }

            let expected = current.status;
            let updated = apply_transition(current, requested, actor, Utc::now());
            match self.store.compare_and_swap(expected, updated.clone()) {
                Ok(()) => {
                    info!(
                        match_id = %match_id,
                        from = expected.label(),
                        to = requested.label(),
                        actor = %actor.id,
                        "match status updated"
                    );
                    return Ok(updated);
                }
                Err(StoreError::StatusConflict { .. }) => continue,
                Err(StoreError::NotFound) => {
                    return Err(MatchingError::MatchNotFound(match_id.clone()))
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(StoreError::Unavailable("match status kept changing during update".to_string()).into())
    }

    /// Record an employer opening the candidate detail view; repeat views change nothing.
    pub fn view_match(&self, match_id: &MatchId, actor: &Actor) -> Result<Match, MatchingError> {
        for _ in 0..MAX_STATUS_ATTEMPTS {
            let current = self
                .store
                .fetch(match_id)?
                .ok_or_else(|| MatchingError::MatchNotFound(match_id.clone()))?;

            if current.status != MatchStatus::Matched {
                return Ok(current);
            }

            let updated = apply_transition(current, MatchStatus::Viewed, actor, Utc::now());
            match self
                .store
                .compare_and_swap(MatchStatus::Matched, updated.clone())
            {
                Ok(()) => return Ok(updated),
                Err(StoreError::StatusConflict { .. }) => continue,
                Err(StoreError::NotFound) => {
                    return Err(MatchingError::MatchNotFound(match_id.clone()))
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(StoreError::Unavailable("match status kept changing during view".to_string()).into())
    }
}

fn job_snapshot(providers: &MatchingProviders, job: JobPosting) -> Result<JobSnapshot, MatchingError> {
    let requirements = providers.jobs.job_requirements(&job.job_id)?;
    let snapshot = JobSnapshot { job, requirements };
    validate_job(&snapshot)?;
    Ok(snapshot)
}

fn candidate_snapshot(
    providers: &MatchingProviders,
    candidate_id: &CandidateId,
) -> Result<CandidateSnapshot, MatchingError> {
    let factors = providers
        .profiles
        .candidate_profile_factors(candidate_id)
        .map_err(|err| match err {
            ProviderError::NotFound(_) => MatchingError::CandidateNotFound(candidate_id.clone()),
            other => other.into(),
        })?;

    let skills = match providers.skills.candidate_skill_scores(candidate_id) {
        Ok(skills) => skills,
        Err(ProviderError::SkillDataUnavailable(reason)) => {
            warn!(candidate_id = %candidate_id, %reason, "skill data unavailable; scoring without skills");
            Vec::new()
        }
        Err(ProviderError::NotFound(_)) => Vec::new(),
        Err(other) => return Err(other.into()),
    };

    let snapshot = CandidateSnapshot {
        candidate_id: candidate_id.clone(),
        skills,
        factors,
    };
    validate_candidate(&snapshot)?;
    Ok(snapshot)
}

fn snapshot_eligible_candidates(
    providers: &MatchingProviders,
) -> Result<(Vec<CandidateSnapshot>, usize), MatchingError> {
    let candidate_ids = providers.profiles.eligible_candidates()?;
    let mut snapshots = Vec::with_capacity(candidate_ids.len());
    let mut skipped = 0;

    for candidate_id in candidate_ids {
        match candidate_snapshot(providers, &candidate_id) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(err) => {
                skipped += 1;
                warn!(candidate_id = %candidate_id, error = %err, "skipping candidate");
            }
        }
    }

    Ok((snapshots, skipped))
}

fn snapshot_active_jobs(
    providers: &MatchingProviders,
    filters: &JobFilters,
) -> Result<Vec<JobSnapshot>, MatchingError> {
    let jobs = providers.jobs.active_jobs(filters)?;
    let mut snapshots = Vec::with_capacity(jobs.len());

    for job in jobs.into_iter().filter(|job| job.is_active() && filters.admits(job)) {
        let job_id = job.job_id.clone();
        match job_snapshot(providers, job) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(err) => warn!(job_id = %job_id, error = %err, "skipping job"),
        }
    }

    Ok(snapshots)
}

fn apply_transition(
    mut record: Match,
    next: MatchStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Match {
    match next {
        MatchStatus::Viewed => {
            record.reviewed_at.get_or_insert(now);
        }
        MatchStatus::Contacted => {
            record.contacted_at.get_or_insert(now);
        }
        _ => {}
    }

    record.history.push(StatusChange {
        from: record.status,
        to: next,
        actor: actor.clone(),
        at: now,
    });
    record.status = next;
    record.updated_at = now;
    record
}

/// Upsert the fresh strict ranking over the existing rows of a job.
///
/// Existing rows keep their id, status, timestamps, and history. Rows an employer has
/// advanced past `matched` are never dropped: when the candidate stops qualifying they
/// stay with `rank = None`. Plain `matched` rows that fall out of the ranking are removed.
fn merge_recalculated(
    job_id: &JobId,
    existing: Vec<Match>,
    ranked: &[RankedMatch],
    fresh: &HashMap<CandidateId, MatchScore>,
    now: DateTime<Utc>,
) -> Vec<Match> {
    let mut previous: HashMap<CandidateId, Match> = existing
        .into_iter()
        .map(|record| (record.candidate_id.clone(), record))
        .collect();

    let mut merged = Vec::with_capacity(ranked.len());
    for entry in ranked {
        let score = entry.score.clone();
        let record = match previous.remove(&score.candidate_id) {
            Some(mut record) => {
                record.overall_score = score.overall_score;
                record.rank = entry.rank;
                record.score = score;
                record.updated_at = now;
                record
            }
            None => Match {
                match_id: next_match_id(),
                candidate_id: score.candidate_id.clone(),
                job_id: job_id.clone(),
                overall_score: score.overall_score,
                rank: entry.rank,
                status: MatchStatus::Matched,
                score,
                contacted_at: None,
                reviewed_at: None,
                created_at: now,
                updated_at: now,
                history: Vec::new(),
            },
        };
        merged.push(record);
    }

    for (candidate_id, mut record) in previous {
        if !record.status.is_advanced() {
            continue;
        }
        if let Some(score) = fresh.get(&candidate_id) {
            record.overall_score = score.overall_score;
            record.score = score.clone();
        }
        record.rank = None;
        record.updated_at = now;
        merged.push(record);
    }

    merged.sort_by(rank_order);
    merged
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("job {job_id} is not active (status {})", .status.label())]
    JobNotActive { job_id: JobId, status: JobStatus },
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("match {match_id} cannot move from {} to {}", .current.label(), .requested.label())]
    InvalidStatusTransition {
        match_id: MatchId,
        current: MatchStatus,
        requested: MatchStatus,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("matching batch exceeded {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("scoring worker failed: {0}")]
    Worker(String),
}
