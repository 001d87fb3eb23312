use super::domain::{
    CandidateSkillEntry, CandidateSnapshot, JobSkillRequirement, JobSnapshot, ProfileFactors,
    SkillId,
};

const MAX_SCORE: f64 = 100.0;
const MAX_WEIGHT: f64 = 1.0;

/// Out-of-range inputs rejected at the provider boundary, before scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("skill {skill_id} score {score} outside 0-100")]
    ScoreOutOfRange { skill_id: SkillId, score: f64 },
    #[error("skill {skill_id} weight {weight} outside 0-1")]
    WeightOutOfRange { skill_id: SkillId, weight: f64 },
    #[error("skill {skill_id} minimum score {minimum_score} outside 0-100")]
    ThresholdOutOfRange {
        skill_id: SkillId,
        minimum_score: f64,
    },
    #[error("years of experience {0} must be a finite, non-negative number")]
    ExperienceOutOfRange(f64),
}

fn within(value: f64, max: f64) -> bool {
    value.is_finite() && (0.0..=max).contains(&value)
}

pub fn validate_skill_entries(entries: &[CandidateSkillEntry]) -> Result<(), ValidationError> {
    for entry in entries {
        if !within(entry.score, MAX_SCORE) {
            return Err(ValidationError::ScoreOutOfRange {
                skill_id: entry.skill_id.clone(),
                score: entry.score,
            });
        }
    }
    Ok(())
}

pub fn validate_requirements(requirements: &[JobSkillRequirement]) -> Result<(), ValidationError> {
    for requirement in requirements {
        if !within(requirement.weight, MAX_WEIGHT) {
            return Err(ValidationError::WeightOutOfRange {
                skill_id: requirement.skill_id.clone(),
                weight: requirement.weight,
            });
        }
        if !within(requirement.minimum_score, MAX_SCORE) {
            return Err(ValidationError::ThresholdOutOfRange {
                skill_id: requirement.skill_id.clone(),
                minimum_score: requirement.minimum_score,
            });
        }
    }
    Ok(())
}

pub fn validate_factors(factors: &ProfileFactors) -> Result<(), ValidationError> {
    let years = factors.years_experience;
    if !years.is_finite() || years < 0.0 {
        return Err(ValidationError::ExperienceOutOfRange(years));
    }
    Ok(())
}

pub fn validate_candidate(candidate: &CandidateSnapshot) -> Result<(), ValidationError> {
    validate_skill_entries(&candidate.skills)?;
    validate_factors(&candidate.factors)
}

pub fn validate_job(job: &JobSnapshot) -> Result<(), ValidationError> {
    validate_requirements(&job.requirements)
}
