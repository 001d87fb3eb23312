use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{JobFilters, JobPosting, LocationType};
use super::scoring::MatchScore;

/// Posting attributes carried alongside a score for sorting, filtering, and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub location_type: LocationType,
    pub posted_at: DateTime<Utc>,
}

impl From<&JobPosting> for JobContext {
    fn from(job: &JobPosting) -> Self {
        Self {
            title: job.title.clone(),
            location_type: job.location_type,
            posted_at: job.posted_at,
        }
    }
}

/// Score awaiting classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub job: JobContext,
    pub score: MatchScore,
}

/// Classified result; `rank` is only assigned in strict mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub job: JobContext,
    pub score: MatchScore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowseSort {
    #[default]
    Score,
    Recent,
}

/// Candidate-selected filters for exploratory browsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseFilters {
    #[serde(default)]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub qualified_only: bool,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub sort: BrowseSort,
}

impl BrowseFilters {
    /// The subset of filters the job provider can apply before scoring.
    pub fn job_filters(&self) -> JobFilters {
        JobFilters {
            location_type: self.location_type,
        }
    }

    fn admits(&self, entry: &ScoredMatch) -> bool {
        if self.qualified_only && !entry.score.qualified {
            return false;
        }
        if let Some(location_type) = self.location_type {
            if entry.job.location_type != location_type {
                return false;
            }
        }
        self.min_score
            .map_or(true, |min_score| entry.score.overall_score >= min_score)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankMode {
    /// Employer ranking: qualified candidates only, dense ranks.
    Strict,
    /// Candidate browsing: every job, caller-chosen filters and sort.
    Exploratory(BrowseFilters),
}

pub fn rank(entries: Vec<ScoredMatch>, mode: &RankMode) -> Vec<RankedMatch> {
    match mode {
        RankMode::Strict => rank_strict(entries),
        RankMode::Exploratory(filters) => rank_exploratory(entries, filters),
    }
}

fn by_score_desc(left: &MatchScore, right: &MatchScore) -> Ordering {
    right.overall_score.total_cmp(&left.overall_score)
}

fn rank_strict(entries: Vec<ScoredMatch>) -> Vec<RankedMatch> {
    let mut qualified: Vec<ScoredMatch> = entries
        .into_iter()
        .filter(|entry| entry.score.qualified)
        .collect();

    qualified.sort_by(|left, right| {
        by_score_desc(&left.score, &right.score)
            .then_with(|| left.score.candidate_id.cmp(&right.score.candidate_id))
    });

    qualified
        .into_iter()
        .zip(1u32..)
        .map(|(entry, rank)| RankedMatch {
            rank: Some(rank),
            job: entry.job,
            score: entry.score,
        })
        .collect()
}

fn rank_exploratory(entries: Vec<ScoredMatch>, filters: &BrowseFilters) -> Vec<RankedMatch> {
    let mut admitted: Vec<ScoredMatch> = entries
        .into_iter()
        .filter(|entry| filters.admits(entry))
        .collect();

    admitted.sort_by(|left, right| {
        let primary = match filters.sort {
            BrowseSort::Score => by_score_desc(&left.score, &right.score),
            BrowseSort::Recent => right
                .job
                .posted_at
                .cmp(&left.job.posted_at)
                .then_with(|| by_score_desc(&left.score, &right.score)),
        };
        primary.then_with(|| left.score.job_id.cmp(&right.score.job_id))
    });

    admitted
        .into_iter()
        .map(|entry| RankedMatch {
            rank: None,
            job: entry.job,
            score: entry.score,
        })
        .collect()
}
