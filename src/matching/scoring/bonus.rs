use std::collections::BTreeSet;

use super::super::domain::{ExperienceLevel, JobPosting, JobSnapshot, LocationType, ProfileFactors};
use super::BonusBreakdown;

const EXPERIENCE_EXACT: f64 = 5.0;
const EXPERIENCE_ADJACENT: f64 = 2.0;
const LOCATION_REMOTE_PREFERRED: f64 = 5.0;
const LOCATION_SAME_CITY: f64 = 5.0;
const LOCATION_SAME_STATE: f64 = 3.0;
const LOCATION_RELOCATION: f64 = 2.0;
const EDUCATION_FIELD_MATCH: f64 = 3.0;
const EDUCATION_SKILL_DOMAIN: f64 = 1.0;
const WORK_HISTORY_MATCH: f64 = 2.0;

/// Words that carry no domain signal when comparing titles and fields of study.
const IGNORED_TERMS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
    "senior", "sr", "junior", "jr", "lead", "principal", "staff", "head", "chief", "intern",
    "associate", "entry", "level", "mid", "ii", "iii", "iv", "engineer", "developer", "manager",
    "specialist", "consultant", "officer", "assistant", "coordinator", "bachelor", "bachelors",
    "master", "masters", "degree", "bs", "ba", "bsc", "ms", "msc", "ma", "phd",
];

pub(crate) fn profile_bonus(job: &JobSnapshot, factors: &ProfileFactors) -> BonusBreakdown {
    BonusBreakdown {
        experience: experience_bonus(job.job.experience_level, factors.years_experience),
        location: location_bonus(&job.job, factors),
        education: education_bonus(job, factors),
        work_history: work_history_bonus(&job.job, factors),
    }
}

fn experience_bonus(level: Option<ExperienceLevel>, years: f64) -> f64 {
    let Some(level) = level else {
        return 0.0;
    };

    let candidate_level = ExperienceLevel::for_years(years);
    if candidate_level == level {
        EXPERIENCE_EXACT
    } else if candidate_level.is_adjacent(level) {
        EXPERIENCE_ADJACENT
    } else {
        0.0
    }
}

fn same_place(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => {
            let left = left.trim();
            !left.is_empty() && left.eq_ignore_ascii_case(right.trim())
        }
        _ => false,
    }
}

fn location_bonus(job: &JobPosting, factors: &ProfileFactors) -> f64 {
    if job.location_type == LocationType::Remote
        && factors.preferred_location_type == Some(LocationType::Remote)
    {
        return LOCATION_REMOTE_PREFERRED;
    }

    let same_state = same_place(job.state.as_deref(), factors.state.as_deref());
    let same_city = same_place(job.city.as_deref(), factors.city.as_deref())
        && (same_state || job.state.is_none() || factors.state.is_none());

    if same_city {
        LOCATION_SAME_CITY
    } else if same_state {
        LOCATION_SAME_STATE
    } else if factors.willing_to_relocate {
        LOCATION_RELOCATION
    } else {
        0.0
    }
}

fn education_bonus(job: &JobSnapshot, factors: &ProfileFactors) -> f64 {
    let mut posting_terms = significant_terms(&job.job.title);
    posting_terms.extend(significant_terms(&job.job.description));

    let field_terms: BTreeSet<String> = factors
        .education
        .iter()
        .filter_map(|education| education.field_of_study.as_deref())
        .flat_map(significant_terms)
        .collect();

    if !field_terms.is_disjoint(&posting_terms) {
        return EDUCATION_FIELD_MATCH;
    }

    let skill_terms: BTreeSet<String> = job
        .requirements
        .iter()
        .flat_map(|requirement| significant_terms(&requirement.skill_name))
        .collect();

    let holds_related_degree = factors.education.iter().any(|education| {
        let mut terms = significant_terms(&education.degree);
        if let Some(field) = education.field_of_study.as_deref() {
            terms.extend(significant_terms(field));
        }
        !terms.is_disjoint(&skill_terms)
    });

    if holds_related_degree {
        EDUCATION_SKILL_DOMAIN
    } else {
        0.0
    }
}

fn work_history_bonus(job: &JobPosting, factors: &ProfileFactors) -> f64 {
    let title_terms = significant_terms(&job.title);
    if title_terms.is_empty() {
        return 0.0;
    }

    let matched = factors
        .work_history
        .iter()
        .any(|entry| !significant_terms(&entry.title).is_disjoint(&title_terms));

    if matched {
        WORK_HISTORY_MATCH
    } else {
        0.0
    }
}

/// Lower-cased alphanumeric terms with seniority, role nouns, and stop-words removed.
pub(crate) fn significant_terms(text: &str) -> BTreeSet<String> {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '+' || ch == '#'))
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(str::to_lowercase)
        .filter(|term| !IGNORED_TERMS.contains(&term.as_str()))
        .collect()
}
