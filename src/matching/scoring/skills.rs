use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::super::domain::{CandidateSkillEntry, JobSkillRequirement, SkillId};
use super::config::ScoringConfig;
use super::{SkillAssessment, SkillBreakdown, SkillPresence};

const SCORE_RANGE: (f64, f64) = (0.0, 100.0);

pub(crate) struct SkillCoverage {
    pub base_score: f64,
    pub cap: Option<f64>,
    pub skill_score: f64,
    pub required_met: u32,
    pub total_required: u32,
    pub breakdown: SkillBreakdown,
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_RANGE.0, SCORE_RANGE.1)
}

/// Highest current score per skill; expired entries are invisible.
fn current_scores(
    entries: &[CandidateSkillEntry],
    as_of: DateTime<Utc>,
) -> HashMap<&SkillId, f64> {
    let mut scores: HashMap<&SkillId, f64> = HashMap::new();
    for entry in entries.iter().filter(|entry| entry.is_current(as_of)) {
        let score = clamp_score(entry.score);
        scores
            .entry(&entry.skill_id)
            .and_modify(|best| *best = best.max(score))
            .or_insert(score);
    }
    scores
}

pub(crate) fn assess_skills(
    entries: &[CandidateSkillEntry],
    requirements: &[JobSkillRequirement],
    config: &ScoringConfig,
    as_of: DateTime<Utc>,
) -> SkillCoverage {
    let scores = current_scores(entries, as_of);

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut plain_sum = 0.0;
    let mut present_count = 0u32;
    let mut required_met = 0u32;
    let mut total_required = 0u32;
    let mut breakdown = SkillBreakdown::default();

    for requirement in requirements {
        let minimum_score = clamp_score(requirement.minimum_score);
        let candidate_score = scores.get(&requirement.skill_id).copied();

        if let Some(score) = candidate_score {
            weighted_sum += score * requirement.weight;
            weight_total += requirement.weight;
            plain_sum += score;
            present_count += 1;
        }

        let meets_minimum = candidate_score.map_or(false, |score| score >= minimum_score);
        if requirement.required {
            total_required += 1;
            if meets_minimum {
                required_met += 1;
            }
        }

        let assessment = SkillAssessment {
            skill_id: requirement.skill_id.clone(),
            skill_name: requirement.skill_name.clone(),
            presence: if candidate_score.is_some() {
                SkillPresence::Present
            } else {
                SkillPresence::Missing
            },
            candidate_score,
            minimum_score,
            weight: requirement.weight,
            required: requirement.required,
            meets_minimum,
        };

        if requirement.required {
            breakdown.required.push(assessment);
        } else {
            breakdown.optional.push(assessment);
        }
    }

    let base_score = if present_count == 0 {
        0.0
    } else if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        // every present skill carries zero weight
        plain_sum / f64::from(present_count)
    };

    let cap = if required_met < total_required {
        let ratio = f64::from(required_met) / f64::from(total_required);
        Some(ratio * config.penalty_scale + config.penalty_floor)
    } else {
        None
    };

    let skill_score = match cap {
        Some(cap) => base_score.min(cap),
        None => base_score,
    };

    SkillCoverage {
        base_score,
        cap,
        skill_score,
        required_met,
        total_required,
        breakdown,
    }
}
