use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, JobId, MatchId};
use super::scoring::MatchScore;
use super::status::{MatchStatus, StatusChange};

/// Persisted employer-side match with its rank and lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: MatchId,
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub overall_score: f64,
    /// Dense position among qualified candidates; `None` when an advanced match no longer qualifies.
    pub rank: Option<u32>,
    pub status: MatchStatus,
    pub score: MatchScore,
    pub contacted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl Match {
    pub fn is_ranked(&self) -> bool {
        self.rank.is_some()
    }
}

/// Storage abstraction for persisted matches.
pub trait MatchStore: Send + Sync {
    /// Swap the complete match set of a job in one step; readers never see a mix.
    fn replace_for_job(&self, job_id: &JobId, matches: Vec<Match>) -> Result<(), StoreError>;

    /// Read the job's current rows, run `merge` over them, and persist its output without
    /// letting any other write land in between. Returns the persisted rows.
    fn merge_for_job(
        &self,
        job_id: &JobId,
        merge: &dyn Fn(Vec<Match>) -> Vec<Match>,
    ) -> Result<Vec<Match>, StoreError>;

    /// Matches for a job ordered by rank, unranked rows last.
    fn for_job(&self, job_id: &JobId) -> Result<Vec<Match>, StoreError>;

    fn fetch(&self, match_id: &MatchId) -> Result<Option<Match>, StoreError>;

    /// Persist `updated` only if the stored status still equals `expected`.
    fn compare_and_swap(&self, expected: MatchStatus, updated: Match) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("match not found")]
    NotFound,
    #[error("match status changed concurrently (now {})", .current.label())]
    StatusConflict { current: MatchStatus },
    #[error("match store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<MatchId, Match>,
    by_job: HashMap<JobId, Vec<MatchId>>,
}

/// Process-local store; a single write lock makes each replace atomic.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    state: RwLock<StoreState>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("match store lock poisoned".to_string())
}

pub(crate) fn rank_order(left: &Match, right: &Match) -> std::cmp::Ordering {
    match (left.rank, right.rank) {
        (Some(left_rank), Some(right_rank)) => left_rank.cmp(&right_rank),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => left.candidate_id.cmp(&right.candidate_id),
    }
}

impl StoreState {
    fn job_rows(&self, job_id: &JobId) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .by_job
            .get(job_id)
            .into_iter()
            .flatten()
            .filter_map(|match_id| self.records.get(match_id).cloned())
            .collect();
        matches.sort_by(rank_order);
        matches
    }

    fn swap_job_rows(&mut self, job_id: &JobId, matches: Vec<Match>) {
        if let Some(previous) = self.by_job.remove(job_id) {
            for match_id in previous {
                self.records.remove(&match_id);
            }
        }

        let ids = matches.iter().map(|record| record.match_id.clone()).collect();
        for record in matches {
            self.records.insert(record.match_id.clone(), record);
        }
        self.by_job.insert(job_id.clone(), ids);
    }
}

impl MatchStore for InMemoryMatchStore {
    fn replace_for_job(&self, job_id: &JobId, matches: Vec<Match>) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.swap_job_rows(job_id, matches);
        Ok(())
    }

    fn merge_for_job(
        &self,
        job_id: &JobId,
        merge: &dyn Fn(Vec<Match>) -> Vec<Match>,
    ) -> Result<Vec<Match>, StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        let merged = merge(state.job_rows(job_id));
        state.swap_job_rows(job_id, merged.clone());
        Ok(merged)
    }

    fn for_job(&self, job_id: &JobId) -> Result<Vec<Match>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.job_rows(job_id))
    }

    fn fetch(&self, match_id: &MatchId) -> Result<Option<Match>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.records.get(match_id).cloned())
    }

    fn compare_and_swap(&self, expected: MatchStatus, updated: Match) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;
        let current = state
            .records
            .get_mut(&updated.match_id)
            .ok_or(StoreError::NotFound)?;

        if current.status != expected {
            return Err(StoreError::StatusConflict {
                current: current.status,
            });
        }

        *current = updated;
        Ok(())
    }
}
