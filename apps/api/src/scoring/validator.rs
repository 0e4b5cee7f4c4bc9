//! Score validator: the one-way safety net for externally produced scores.
//!
//! An external score is only ever lowered (by recomputing locally), never raised.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matching::classifier::MatchClassifier;
use crate::matching::taxonomy::SkillTaxonomy;
use crate::scoring::fit::MAX_SCORE;

/// Scores above `expected_max × INFLATION_TOLERANCE` are treated as inflated.
const INFLATION_TOLERANCE: f64 = 1.2;

/// Low-ratio guard rails: `(ratio below, score above)`.
const LOW_MATCH_CEILINGS: &[(f64, f64)] = &[(0.10, 10.0), (0.20, 20.0), (0.30, 35.0)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecomputeReason {
    NotANumber,
    OutOfRange { score: f64 },
    LowMatchInflated { ratio: f64, score: f64, ceiling: f64 },
    AboveExpectedMax { score: f64, expected_max: f64 },
}

impl fmt::Display for RecomputeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomputeReason::NotANumber => write!(f, "external score is not a finite number"),
            RecomputeReason::OutOfRange { score } => {
                write!(f, "external score {score} is outside 0-{MAX_SCORE}")
            }
            RecomputeReason::LowMatchInflated {
                ratio,
                score,
                ceiling,
            } => write!(
                f,
                "external score {score} exceeds {ceiling} at match ratio {:.0}%",
                ratio * 100.0
            ),
            RecomputeReason::AboveExpectedMax {
                score,
                expected_max,
            } => write!(
                f,
                "external score {score} exceeds expected maximum {expected_max:.1} by more than 20%"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Accept { score: u32 },
    Recompute { reason: RecomputeReason },
}

/// Highest score plausible for an unpenalized match ratio.
pub fn expected_max(ratio: f64) -> f64 {
    if ratio >= 0.90 {
        85.0
    } else if ratio >= 0.75 {
        79.0
    } else if ratio >= 0.60 {
        69.0
    } else if ratio >= 0.50 {
        54.0
    } else if ratio >= 0.30 {
        39.0
    } else if ratio >= 0.15 {
        24.0
    } else {
        ratio * (10.0 / 0.15)
    }
}

pub struct ScoreValidator<'a> {
    taxonomy: &'a SkillTaxonomy,
}

impl<'a> ScoreValidator<'a> {
    pub fn new(taxonomy: &'a SkillTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// `(exact + 0.5 × related) / total`, no missing penalty. `None` without keywords.
    pub fn unpenalized_ratio<S: AsRef<str>, K: AsRef<str>>(
        &self,
        skills: &[S],
        keywords: &[K],
    ) -> Option<f64> {
        if keywords.is_empty() {
            return None;
        }
        let partition = MatchClassifier::new(self.taxonomy).partition(skills, keywords);
        let weighted = partition.exact.len() as f64 + partition.related.len() as f64 * 0.5;
        Some(weighted / partition.total() as f64)
    }

    /// Checks an untrusted external score. Anything that is not a JSON number
    /// (including numeric strings) counts as not-a-number.
    pub fn validate<S: AsRef<str>, K: AsRef<str>>(
        &self,
        external: &Value,
        skills: &[S],
        keywords: &[K],
    ) -> Verdict {
        let score = match external.as_f64() {
            Some(s) if s.is_finite() => s,
            _ => {
                return Verdict::Recompute {
                    reason: RecomputeReason::NotANumber,
                }
            }
        };
        self.validate_number(score, self.unpenalized_ratio(skills, keywords))
    }

    /// Without a ratio (no keywords) only the type and range checks apply.
    pub fn validate_number(&self, score: f64, ratio: Option<f64>) -> Verdict {
        if !score.is_finite() {
            return Verdict::Recompute {
                reason: RecomputeReason::NotANumber,
            };
        }
        if !(0.0..=MAX_SCORE as f64).contains(&score) {
            return Verdict::Recompute {
                reason: RecomputeReason::OutOfRange { score },
            };
        }

        if let Some(ratio) = ratio {
            for &(below, ceiling) in LOW_MATCH_CEILINGS {
                if ratio < below && score > ceiling {
                    return Verdict::Recompute {
                        reason: RecomputeReason::LowMatchInflated {
                            ratio,
                            score,
                            ceiling,
                        },
                    };
                }
            }

            let expected_max = expected_max(ratio);
            if score > expected_max * INFLATION_TOLERANCE {
                return Verdict::Recompute {
                    reason: RecomputeReason::AboveExpectedMax {
                        score,
                        expected_max,
                    },
                };
            }
        }

        Verdict::Accept {
            score: score.round() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator_for<'a>(taxonomy: &'a SkillTaxonomy) -> ScoreValidator<'a> {
        ScoreValidator::new(taxonomy)
    }

    #[test]
    fn test_low_ratio_inflated_score_triggers_recompute() {
        let taxonomy = SkillTaxonomy::standard();
        let verdict = validator_for(&taxonomy).validate_number(90.0, Some(0.05));
        match verdict {
            Verdict::Recompute {
                reason: RecomputeReason::LowMatchInflated { ceiling, .. },
            } => assert_eq!(ceiling, 10.0),
            other => panic!("expected low-match recompute, got {other:?}"),
        }
    }

    #[test]
    fn test_low_ratio_from_real_keywords_triggers_recompute() {
        let taxonomy = SkillTaxonomy::standard();
        let keywords: Vec<String> = (0..20).map(|i| format!("tool-{i}")).collect();
        let skills = vec!["tool-0".to_string()];
        let validator = validator_for(&taxonomy);
        assert_eq!(validator.unpenalized_ratio(&skills, &keywords), Some(0.05));
        assert!(matches!(
            validator.validate(&json!(90), &skills, &keywords),
            Verdict::Recompute { .. }
        ));
    }

    #[test]
    fn test_non_numeric_scores_recompute() {
        let taxonomy = SkillTaxonomy::standard();
        let validator = validator_for(&taxonomy);
        let skills = ["Python"];
        let keywords = ["Python"];
        for bad in [json!("85"), json!(null), json!({"score": 80}), json!([80])] {
            assert_eq!(
                validator.validate(&bad, &skills, &keywords),
                Verdict::Recompute {
                    reason: RecomputeReason::NotANumber
                }
            );
        }
        assert_eq!(
            validator.validate_number(f64::NAN, None),
            Verdict::Recompute {
                reason: RecomputeReason::NotANumber
            }
        );
    }

    #[test]
    fn test_out_of_range_recomputes_even_without_keywords() {
        let taxonomy = SkillTaxonomy::standard();
        let validator = validator_for(&taxonomy);
        assert!(matches!(
            validator.validate_number(140.0, None),
            Verdict::Recompute {
                reason: RecomputeReason::OutOfRange { .. }
            }
        ));
        assert!(matches!(
            validator.validate_number(-1.0, None),
            Verdict::Recompute {
                reason: RecomputeReason::OutOfRange { .. }
            }
        ));
        assert_eq!(
            validator.validate_number(92.4, None),
            Verdict::Accept { score: 92 }
        );
    }

    #[test]
    fn test_plausible_score_is_accepted_unmodified() {
        let taxonomy = SkillTaxonomy::standard();
        let validator = validator_for(&taxonomy);
        let skills = ["Python", "Docker"];
        let keywords = ["Python", "Docker"];
        assert_eq!(
            validator.validate(&json!(88), &skills, &keywords),
            Verdict::Accept { score: 88 }
        );
    }

    #[test]
    fn test_inflated_score_above_band_recomputes() {
        let taxonomy = SkillTaxonomy::standard();
        let validator = validator_for(&taxonomy);
        // ratio 0.5 → expected max 54, tolerance 64.8
        assert_eq!(
            validator.validate_number(64.0, Some(0.5)),
            Verdict::Accept { score: 64 }
        );
        assert!(matches!(
            validator.validate_number(65.0, Some(0.5)),
            Verdict::Recompute {
                reason: RecomputeReason::AboveExpectedMax { .. }
            }
        ));
    }

    #[test]
    fn test_low_ratio_ceilings() {
        let taxonomy = SkillTaxonomy::standard();
        let validator = validator_for(&taxonomy);
        assert!(matches!(
            validator.validate_number(21.0, Some(0.18)),
            Verdict::Recompute { .. }
        ));
        assert!(matches!(
            validator.validate_number(36.0, Some(0.25)),
            Verdict::Recompute { .. }
        ));
        assert_eq!(
            validator.validate_number(20.0, Some(0.25)),
            Verdict::Accept { score: 20 }
        );
    }

    #[test]
    fn test_expected_max_bands() {
        assert_eq!(expected_max(0.95), 85.0);
        assert_eq!(expected_max(0.75), 79.0);
        assert_eq!(expected_max(0.6), 69.0);
        assert_eq!(expected_max(0.5), 54.0);
        assert_eq!(expected_max(0.3), 39.0);
        assert_eq!(expected_max(0.15), 24.0);
        assert!((expected_max(0.06) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_reason_renders_human_readable() {
        let reason = RecomputeReason::LowMatchInflated {
            ratio: 0.05,
            score: 90.0,
            ceiling: 10.0,
        };
        assert_eq!(
            reason.to_string(),
            "external score 90 exceeds 10 at match ratio 5%"
        );
    }
}
