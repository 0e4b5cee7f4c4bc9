//! Fit score: the deterministic 0-100 multi-factor score with its component breakdown.
//!
//! With job keywords (max points per component):
//! skills match 70, experience relevance 10, experience years 8,
//! education 5, certification 5, job stability 2.
//!
//! Without job keywords the score falls back to skill-count buckets plus an
//! experience bonus; the remaining components are still computed and reported
//! alongside for transparency.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::matching::classifier::{KeywordPartition, MatchClassifier};
use crate::matching::taxonomy::SkillTaxonomy;
use crate::matching::text::{join_lowercase, normalize, TermSet};
use crate::models::candidate::{Certification, EducationEntry, ExperienceEntry};
use crate::scoring::experience::ExperienceEstimator;

pub const MAX_SCORE: u32 = 100;

const CS_EDUCATION_VOCABULARY: &[&str] = &[
    "computer science",
    "computer engineering",
    "information technology",
    "information systems",
    "software",
    "computing",
    "data science",
    "informatics",
    "cs",
    "it",
];

const GENERAL_EDUCATION_VOCABULARY: &[&str] = &[
    "engineering",
    "mathematics",
    "math",
    "maths",
    "physics",
    "statistics",
    "electronics",
    "electrical",
    "bachelor",
    "bachelors",
    "bachelor's",
    "master",
    "masters",
    "master's",
    "b.tech",
    "btech",
    "m.tech",
    "b.e",
    "bsc",
    "b.sc",
    "msc",
    "m.sc",
    "phd",
];

const HIGH_VALUE_CERTIFICATION_VOCABULARY: &[&str] = &[
    "aws",
    "azure",
    "gcp",
    "google cloud",
    "kubernetes",
    "cka",
    "ckad",
    "docker",
    "terraform",
    "hashicorp",
    "ci/cd",
    "jenkins",
    "cisco",
    "ccna",
    "oracle",
    "microsoft",
    "red hat",
    "comptia",
    "salesforce",
];

static CS_EDUCATION_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(CS_EDUCATION_VOCABULARY));
static GENERAL_EDUCATION_TERMS: Lazy<TermSet> =
    Lazy::new(|| TermSet::new(GENERAL_EDUCATION_VOCABULARY));
static HIGH_VALUE_CERTIFICATION_TERMS: Lazy<TermSet> =
    Lazy::new(|| TermSet::new(HIGH_VALUE_CERTIFICATION_VOCABULARY));

/// Weights of the weighted match ratio. Kept overridable for behavior parity
/// experiments; the defaults are the production values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub exact: f64,
    pub related: f64,
    pub missing_penalty: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            exact: 1.0,
            related: 0.5,
            missing_penalty: 0.2,
        }
    }
}

impl MatchWeights {
    /// `(exact×w_e + related×w_r − missing×w_m) / total`, clamped to [0, 1].
    pub fn ratio(&self, partition: &KeywordPartition) -> f64 {
        let total = partition.total();
        if total == 0 {
            return 0.0;
        }
        let weighted = partition.exact.len() as f64 * self.exact
            + partition.related.len() as f64 * self.related
            - partition.missing.len() as f64 * self.missing_penalty;
        (weighted / total as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    KeywordMatch,
    SkillCount,
}

/// Components computed but not counted toward the total (skill-count mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceComponents {
    pub education: u32,
    pub certification: u32,
    pub job_stability: u32,
}

/// Named score components. The counted components always sum to `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub mode: ScoringMode,
    pub skills_match: u32,
    pub experience_relevance: u32,
    pub experience_years: u32,
    pub education: u32,
    pub certification: u32,
    pub job_stability: u32,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceComponents>,
}

impl ScoreBreakdown {
    fn component_sum(&self) -> u32 {
        self.skills_match
            + self.experience_relevance
            + self.experience_years
            + self.education
            + self.certification
            + self.job_stability
    }
}

/// Everything the calculator looks at.
#[derive(Debug, Clone, Copy)]
pub struct FitInputs<'a> {
    pub skills: &'a [String],
    pub keywords: &'a [String],
    pub experience_years: Option<f64>,
    pub education: &'a [EducationEntry],
    pub certifications: &'a [Certification],
    pub experience: &'a [ExperienceEntry],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScore {
    pub score: u32,
    pub match_ratio: f64,
    pub breakdown: ScoreBreakdown,
    pub partition: KeywordPartition,
}

pub struct FitScoreCalculator<'a> {
    taxonomy: &'a SkillTaxonomy,
    estimator: &'a ExperienceEstimator,
    weights: MatchWeights,
}

impl<'a> FitScoreCalculator<'a> {
    pub fn new(
        taxonomy: &'a SkillTaxonomy,
        estimator: &'a ExperienceEstimator,
        weights: MatchWeights,
    ) -> Self {
        Self {
            taxonomy,
            estimator,
            weights,
        }
    }

    pub fn score(&self, inputs: &FitInputs<'_>) -> FitScore {
        let education = education_points(inputs.education);
        let certification = certification_points(inputs.certifications, inputs.keywords);
        let job_stability = self.stability_points(inputs.experience);
        let years = inputs.experience_years.unwrap_or(0.0);

        if inputs.keywords.is_empty() {
            let mut breakdown = ScoreBreakdown {
                mode: ScoringMode::SkillCount,
                skills_match: skill_count_points(inputs.skills.len()),
                experience_relevance: 0,
                experience_years: (years * 1.5).clamp(0.0, 10.0).floor() as u32,
                education: 0,
                certification: 0,
                job_stability: 0,
                total: 0,
                reference: Some(ReferenceComponents {
                    education,
                    certification,
                    job_stability,
                }),
            };
            breakdown.total = breakdown.component_sum().min(MAX_SCORE);
            return FitScore {
                score: breakdown.total,
                match_ratio: 0.0,
                breakdown,
                partition: KeywordPartition::default(),
            };
        }

        let partition =
            MatchClassifier::new(self.taxonomy).partition(inputs.skills, inputs.keywords);
        let match_ratio = self.weights.ratio(&partition);

        let mut breakdown = ScoreBreakdown {
            mode: ScoringMode::KeywordMatch,
            skills_match: skills_match_points(match_ratio),
            experience_relevance: self.relevance_points(inputs.experience, inputs.keywords),
            experience_years: experience_years_points(years),
            education,
            certification,
            job_stability,
            total: 0,
            reference: None,
        };
        breakdown.total = breakdown.component_sum().min(MAX_SCORE);

        FitScore {
            score: breakdown.total,
            match_ratio,
            breakdown,
            partition,
        }
    }

    /// Distinct keywords (or one of their equivalents) mentioned anywhere in the
    /// experience text: ≥5 → 10, ≥3 → 7, ≥1 → 3.
    fn relevance_points(&self, experience: &[ExperienceEntry], keywords: &[String]) -> u32 {
        let texts: Vec<String> = experience.iter().map(ExperienceEntry::text).collect();
        let text = join_lowercase(texts.iter().map(String::as_str));
        if text.is_empty() {
            return 0;
        }

        let mut counted = std::collections::HashSet::new();
        let found = keywords
            .iter()
            .filter(|k| counted.insert(normalize(k)))
            .filter(|k| TermSet::new(self.taxonomy.equivalents(k)).is_match(&text))
            .count();

        match found {
            n if n >= 5 => 10,
            n if n >= 3 => 7,
            n if n >= 1 => 3,
            _ => 0,
        }
    }

    /// Average tenure ≥2y → 2, ≥1y → 1, else 0 (raw 5/3/1 halved with integer division).
    fn stability_points(&self, experience: &[ExperienceEntry]) -> u32 {
        let tenures: Vec<f64> = experience
            .iter()
            .filter_map(|e| self.estimator.tenure_months(e))
            .collect();
        if tenures.is_empty() {
            return 0;
        }
        let average_years = tenures.iter().sum::<f64>() / tenures.len() as f64 / 12.0;
        let raw = if average_years >= 2.0 {
            5
        } else if average_years >= 1.0 {
            3
        } else {
            1
        };
        raw / 2
    }
}

/// Piecewise-linear skills component (0-70) over the weighted match ratio.
pub fn skills_match_points(ratio: f64) -> u32 {
    let points = if ratio >= 0.90 {
        70.0
    } else if ratio >= 0.75 {
        54.0 + ((ratio - 0.75) * 107.0).floor()
    } else if ratio >= 0.60 {
        42.0 + ((ratio - 0.60) * 80.0).floor()
    } else if ratio >= 0.45 {
        28.0 + ((ratio - 0.45) * 93.0).floor()
    } else if ratio >= 0.30 {
        14.0 + ((ratio - 0.30) * 93.0).floor()
    } else if ratio >= 0.15 {
        5.0 + ((ratio - 0.15) * 60.0).floor()
    } else {
        (ratio * (5.0 / 0.15)).floor()
    };
    points.max(0.0) as u32
}

pub fn experience_years_points(years: f64) -> u32 {
    if years >= 5.0 {
        8
    } else if years >= 3.0 {
        5
    } else if years >= 1.0 {
        2
    } else if years >= 0.5 {
        1
    } else {
        0
    }
}

/// Education (0-5): CS/IT vocabulary → 10, engineering/science/generic degree → 5,
/// anything else → 2, halved. No education → 0.
pub fn education_points(education: &[EducationEntry]) -> u32 {
    let texts: Vec<String> = education.iter().map(EducationEntry::text).collect();
    let text = join_lowercase(texts.iter().map(String::as_str));
    if text.is_empty() {
        return 0;
    }
    let raw = if CS_EDUCATION_TERMS.is_match(&text) {
        10
    } else if GENERAL_EDUCATION_TERMS.is_match(&text) {
        5
    } else {
        2
    };
    raw / 2
}

/// Certification (0-5). Without keywords any certification is worth raw 5.
/// With keywords, certifications naming a keyword or a high-value vendor/tool
/// count: ≥2 → 10, 1 → 7, none → 3; halved.
pub fn certification_points(certifications: &[Certification], keywords: &[String]) -> u32 {
    if certifications.is_empty() {
        return 0;
    }
    if keywords.is_empty() {
        return 5 / 2;
    }

    let keyword_terms = TermSet::new(keywords);
    let relevant = certifications
        .iter()
        .filter(|cert| {
            let text = cert.text();
            keyword_terms.is_match(&text) || HIGH_VALUE_CERTIFICATION_TERMS.is_match(&text)
        })
        .count();

    let raw = if relevant >= 2 {
        10
    } else if relevant >= 1 {
        7
    } else {
        3
    };
    raw / 2
}

/// Skill-count buckets used when the job has no keywords.
pub fn skill_count_points(count: usize) -> u32 {
    match count {
        n if n >= 15 => 85,
        n if n >= 10 => 70,
        n if n >= 7 => 55,
        n if n >= 5 => 40,
        n if n >= 3 => 25,
        n => n as u32 * 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::DateMarker;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn make_entry(role: &str, description: &str, start: Option<NaiveDate>) -> ExperienceEntry {
        ExperienceEntry {
            role: role.to_string(),
            company: String::new(),
            start: start.map_or(DateMarker::Absent, DateMarker::Date),
            end: DateMarker::Present,
            description: description.to_string(),
        }
    }

    struct Fixture {
        taxonomy: SkillTaxonomy,
        estimator: ExperienceEstimator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                taxonomy: SkillTaxonomy::standard(),
                estimator: ExperienceEstimator::new(ymd(2024, 7, 1)),
            }
        }

        fn calculator(&self) -> FitScoreCalculator<'_> {
            FitScoreCalculator::new(&self.taxonomy, &self.estimator, MatchWeights::default())
        }
    }

    fn score_skills(skills: &[&str], keywords: &[&str]) -> FitScore {
        let fx = Fixture::new();
        let skills = strings(skills);
        let keywords = strings(keywords);
        fx.calculator().score(&FitInputs {
            skills: &skills,
            keywords: &keywords,
            experience_years: None,
            education: &[],
            certifications: &[],
            experience: &[],
        })
    }

    #[test]
    fn test_one_exact_one_related_skills_component_is_54() {
        let fit = score_skills(&["Python"], &["Python", "Django"]);
        assert_eq!(fit.partition.exact.len(), 1);
        assert_eq!(fit.partition.related.len(), 1);
        assert!(fit.partition.missing.is_empty());
        assert!((fit.match_ratio - 0.75).abs() < 1e-12);
        assert_eq!(fit.breakdown.skills_match, 54);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let fit = score_skills(&["Java"], &["C#", ".NET", "AWS"]);
        assert_eq!(fit.partition.missing.len(), 3);
        assert_eq!(fit.match_ratio, 0.0);
        assert_eq!(fit.breakdown.skills_match, 0);
        assert_eq!(fit.score, 0);
    }

    #[test]
    fn test_skills_match_bands() {
        assert_eq!(skills_match_points(1.0), 70);
        assert_eq!(skills_match_points(0.90), 70);
        assert_eq!(skills_match_points(0.80), 59);
        assert_eq!(skills_match_points(0.60), 42);
        assert_eq!(skills_match_points(0.50), 32);
        assert_eq!(skills_match_points(0.30), 14);
        assert_eq!(skills_match_points(0.20), 8);
        assert_eq!(skills_match_points(0.10), 3);
        assert_eq!(skills_match_points(0.0), 0);
    }

    #[test]
    fn test_skills_match_is_monotonic_in_ratio() {
        let mut previous = 0;
        for step in 0..=1000 {
            let points = skills_match_points(step as f64 / 1000.0);
            assert!(points >= previous, "dropped at ratio {}", step as f64 / 1000.0);
            assert!(points <= 70);
            previous = points;
        }
    }

    #[test]
    fn test_score_monotonic_in_exact_count() {
        let keywords = ["Rust", "Kafka", "Terraform", "GraphQL", "Elixir", "Haskell"];
        let mut previous = 0;
        for k in 0..=keywords.len() {
            let fit = score_skills(&keywords[..k], &keywords);
            assert_eq!(fit.partition.exact.len(), k);
            assert!(fit.score >= previous, "score dropped at exact={k}");
            previous = fit.score;
        }
    }

    #[test]
    fn test_score_non_increasing_in_missing_count() {
        let base = ["Rust", "Kafka"];
        let extras = ["Elixir", "Haskell", "Fortran", "COBOL"];
        let mut previous = u32::MAX;
        for m in 0..=extras.len() {
            let keywords: Vec<&str> = base.iter().chain(extras[..m].iter()).copied().collect();
            let fit = score_skills(&base, &keywords);
            assert_eq!(fit.partition.missing.len(), m);
            assert!(fit.score <= previous, "score rose at missing={m}");
            previous = fit.score;
        }
    }

    #[test]
    fn test_custom_weights_change_ratio() {
        let fx = Fixture::new();
        let weights = MatchWeights {
            related: 1.0,
            ..MatchWeights::default()
        };
        let calc = FitScoreCalculator::new(&fx.taxonomy, &fx.estimator, weights);
        let skills = strings(&["Python"]);
        let keywords = strings(&["Django"]);
        let fit = calc.score(&FitInputs {
            skills: &skills,
            keywords: &keywords,
            experience_years: None,
            education: &[],
            certifications: &[],
            experience: &[],
        });
        assert_eq!(fit.match_ratio, 1.0);
        assert_eq!(fit.breakdown.skills_match, 70);
    }

    #[test]
    fn test_experience_relevance_counts_keywords_and_equivalents() {
        let fx = Fixture::new();
        let experience = vec![make_entry(
            "Backend Engineer",
            "Built Django services on PostgreSQL with Docker and Kubernetes, deployed via Jenkins",
            None,
        )];
        let keywords = strings(&["Python", "SQL", "Docker", "Kubernetes", "CI/CD", "Rust"]);
        // python (via django), sql (via postgresql), docker, kubernetes, ci/cd (via jenkins)
        assert_eq!(fx.calculator().relevance_points(&experience, &keywords), 10);
        assert_eq!(
            fx.calculator().relevance_points(&experience, &strings(&["Rust", "Docker"])),
            3
        );
        assert_eq!(fx.calculator().relevance_points(&[], &keywords), 0);
    }

    #[test]
    fn test_experience_years_points() {
        assert_eq!(experience_years_points(6.0), 8);
        assert_eq!(experience_years_points(3.0), 5);
        assert_eq!(experience_years_points(1.2), 2);
        assert_eq!(experience_years_points(0.5), 1);
        assert_eq!(experience_years_points(0.2), 0);
    }

    #[test]
    fn test_education_points() {
        let cs = EducationEntry {
            degree: "B.Tech".to_string(),
            field: "Computer Science".to_string(),
            institution: "IIT".to_string(),
        };
        let physics = EducationEntry {
            degree: "BSc".to_string(),
            field: "Physics".to_string(),
            institution: "Somewhere".to_string(),
        };
        let arts = EducationEntry {
            degree: "Diploma".to_string(),
            field: "Fine Arts".to_string(),
            institution: "Art School".to_string(),
        };
        assert_eq!(education_points(&[cs]), 5);
        assert_eq!(education_points(&[physics]), 2);
        assert_eq!(education_points(&[arts]), 1);
        assert_eq!(education_points(&[]), 0);
    }

    #[test]
    fn test_certification_points() {
        let cert = |name: &str| Certification {
            name: name.to_string(),
            issuer: None,
        };
        let keywords = strings(&["Kubernetes"]);
        assert_eq!(certification_points(&[], &keywords), 0);
        assert_eq!(certification_points(&[cert("First Aid")], &[]), 2);
        assert_eq!(certification_points(&[cert("First Aid")], &keywords), 1);
        assert_eq!(certification_points(&[cert("CKA Kubernetes Admin")], &keywords), 3);
        assert_eq!(
            certification_points(
                &[cert("CKA Kubernetes Admin"), cert("AWS Solutions Architect")],
                &keywords
            ),
            5
        );
    }

    #[test]
    fn test_job_stability_points() {
        let fx = Fixture::new();
        let calc = fx.calculator();
        let long = make_entry("Engineer", "", Some(ymd(2021, 7, 1)));
        let mid = make_entry("Engineer", "", Some(ymd(2023, 1, 1)));
        let short = make_entry("Engineer", "", Some(ymd(2024, 3, 1)));
        assert_eq!(calc.stability_points(&[long]), 2);
        assert_eq!(calc.stability_points(&[mid]), 1);
        assert_eq!(calc.stability_points(&[short]), 0);
        assert_eq!(calc.stability_points(&[]), 0);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let fx = Fixture::new();
        let skills = strings(&["Python", "Docker", "AWS", "Linux"]);
        let keywords = strings(&["Python", "Docker", "AWS", "Linux", "Kubernetes"]);
        let experience = vec![make_entry(
            "Software Engineer",
            "Python services in Docker on AWS",
            Some(ymd(2019, 7, 1)),
        )];
        let education = vec![EducationEntry {
            degree: "BSc Computer Science".to_string(),
            ..EducationEntry::default()
        }];
        let certifications = vec![Certification {
            name: "AWS Developer".to_string(),
            issuer: Some("Amazon".to_string()),
        }];
        let fit = fx.calculator().score(&FitInputs {
            skills: &skills,
            keywords: &keywords,
            experience_years: Some(4.0),
            education: &education,
            certifications: &certifications,
            experience: &experience,
        });
        let b = &fit.breakdown;
        assert_eq!(b.mode, ScoringMode::KeywordMatch);
        assert_eq!(b.component_sum(), b.total);
        assert_eq!(fit.score, b.total);
        assert!(fit.score <= MAX_SCORE);
        // ratio (4 - 0.2)/5 = 0.76 → 54 + 1
        assert_eq!(b.skills_match, 55);
        assert_eq!(b.experience_relevance, 7);
        assert_eq!(b.experience_years, 5);
        assert_eq!(b.education, 5);
        assert_eq!(b.certification, 3);
        assert_eq!(b.job_stability, 2);
        assert_eq!(fit.score, 77);
    }

    #[test]
    fn test_empty_keywords_uses_skill_count_buckets() {
        let fx = Fixture::new();
        let skills: Vec<String> = (0..10).map(|i| format!("skill-{i}")).collect();
        let education = vec![EducationEntry {
            degree: "MSc Computer Science".to_string(),
            ..EducationEntry::default()
        }];
        let fit = fx.calculator().score(&FitInputs {
            skills: &skills,
            keywords: &[],
            experience_years: Some(4.0),
            education: &education,
            certifications: &[],
            experience: &[],
        });
        assert_eq!(fit.breakdown.mode, ScoringMode::SkillCount);
        assert_eq!(fit.breakdown.skills_match, 70);
        assert_eq!(fit.breakdown.experience_years, 6);
        assert_eq!(fit.score, 76);
        assert_eq!(fit.breakdown.component_sum(), fit.score);
        let reference = fit.breakdown.reference.expect("reference components");
        assert_eq!(reference.education, 5);
    }

    #[test]
    fn test_skill_count_buckets_and_experience_cap() {
        assert_eq!(skill_count_points(20), 85);
        assert_eq!(skill_count_points(7), 55);
        assert_eq!(skill_count_points(5), 40);
        assert_eq!(skill_count_points(3), 25);
        assert_eq!(skill_count_points(2), 16);
        assert_eq!(skill_count_points(0), 0);

        let fx = Fixture::new();
        let skills: Vec<String> = (0..15).map(|i| format!("s{i}")).collect();
        let fit = fx.calculator().score(&FitInputs {
            skills: &skills,
            keywords: &[],
            experience_years: Some(30.0),
            education: &[],
            certifications: &[],
            experience: &[],
        });
        assert_eq!(fit.score, 95);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a = score_skills(&["Python", "MySQL"], &["Python", "PostgreSQL", "Go"]);
        let b = score_skills(&["Python", "MySQL"], &["Python", "PostgreSQL", "Go"]);
        assert_eq!(a, b);
    }
}
