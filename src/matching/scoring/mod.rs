mod bonus;
mod config;
mod skills;

pub use config::ScoringConfig;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, CandidateSnapshot, JobId, JobSnapshot, SkillId};
use bonus::profile_bonus;
use skills::assess_skills;

const MAX_OVERALL_SCORE: f64 = 100.0;

/// Stateless scorer pairing one candidate snapshot with one job snapshot.
///
/// The engine performs no I/O: expiry is judged against the caller supplied `as_of`
/// instant, and every lookup has already happened in the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn compute(
        &self,
        candidate: &CandidateSnapshot,
        job: &JobSnapshot,
        as_of: DateTime<Utc>,
    ) -> MatchScore {
        let coverage = assess_skills(&candidate.skills, &job.requirements, &self.config, as_of);

        let bonus = profile_bonus(job, &candidate.factors);
        let bonus_points = bonus.total().min(self.config.max_bonus);

        let overall_score = (coverage.skill_score + bonus_points).clamp(0.0, MAX_OVERALL_SCORE);

        MatchScore {
            candidate_id: candidate.candidate_id.clone(),
            job_id: job.job.job_id.clone(),
            base_skill_score: coverage.base_score,
            skill_cap: coverage.cap,
            skill_score: coverage.skill_score,
            bonus_points,
            bonus,
            overall_score,
            required_skills_met: coverage.required_met,
            total_required_skills: coverage.total_required,
            qualified: coverage.required_met == coverage.total_required,
            skill_breakdown: coverage.breakdown,
        }
    }
}

/// Per-pair scoring result. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    /// Weighted average over present skills, before the required-skill cap.
    pub base_skill_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_cap: Option<f64>,
    pub skill_score: f64,
    pub bonus_points: f64,
    pub bonus: BonusBreakdown,
    pub overall_score: f64,
    pub required_skills_met: u32,
    pub total_required_skills: u32,
    pub qualified: bool,
    pub skill_breakdown: SkillBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusBreakdown {
    pub experience: f64,
    pub location: f64,
    pub education: f64,
    pub work_history: f64,
}

impl BonusBreakdown {
    pub fn total(&self) -> f64 {
        self.experience + self.location + self.education + self.work_history
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub required: Vec<SkillAssessment>,
    pub optional: Vec<SkillAssessment>,
}

impl SkillBreakdown {
    pub fn missing_required(&self) -> impl Iterator<Item = &SkillAssessment> {
        self.required.iter().filter(|skill| !skill.meets_minimum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillPresence {
    Present,
    Missing,
}

/// One job skill as seen from the candidate's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub skill_id: SkillId,
    pub skill_name: String,
    pub presence: SkillPresence,
    pub candidate_score: Option<f64>,
    pub minimum_score: f64,
    pub weight: f64,
    pub required: bool,
    pub meets_minimum: bool,
}
