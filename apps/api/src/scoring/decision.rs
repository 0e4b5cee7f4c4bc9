use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::ThresholdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Interview,
    Hold,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Interview => "INTERVIEW",
            Decision::Hold => "HOLD",
            Decision::Reject => "REJECT",
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

const HIGH_PRIORITY_MIN_SCORE: u32 = 75;
const HIGH_PRIORITY_MIN_YEARS: f64 = 3.0;

/// Decision cut-offs. `hold <= interview` is enforced where thresholds enter
/// the system (config and request bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub interview: u32,
    pub hold: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            interview: 65,
            hold: 45,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let Thresholds { interview, hold } = *self;
        if interview > 100 || hold > 100 {
            return Err(ThresholdError::OutOfRange { interview, hold });
        }
        if hold > interview {
            return Err(ThresholdError::Inverted { interview, hold });
        }
        Ok(())
    }
}

pub fn decide(score: u32, thresholds: &Thresholds) -> Decision {
    if score >= thresholds.interview {
        Decision::Interview
    } else if score >= thresholds.hold {
        Decision::Hold
    } else {
        Decision::Reject
    }
}

pub fn priority(decision: Decision, score: u32, experience_years: Option<f64>) -> Priority {
    match decision {
        Decision::Interview
            if score >= HIGH_PRIORITY_MIN_SCORE
                && experience_years.unwrap_or(0.0) >= HIGH_PRIORITY_MIN_YEARS =>
        {
            Priority::High
        }
        Decision::Interview => Priority::Medium,
        Decision::Hold | Decision::Reject => Priority::Low,
    }
}

/// Batch ordering key, compared lexicographically in this field order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankKey {
    pub match_ratio: f64,
    pub matched_skills: usize,
    pub inferred_skills: usize,
    pub score: u32,
}

impl RankKey {
    fn compare(&self, other: &Self) -> Ordering {
        self.match_ratio
            .total_cmp(&other.match_ratio)
            .then(self.matched_skills.cmp(&other.matched_skills))
            .then(self.inferred_skills.cmp(&other.inferred_skills))
            .then(self.score.cmp(&other.score))
    }
}

/// Sorts best-first. Stable: equal keys keep their input order.
pub fn rank_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> RankKey,
{
    items.sort_by(|a, b| key(b).compare(&key(a)));
}
