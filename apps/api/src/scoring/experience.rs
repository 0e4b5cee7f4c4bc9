//! Experience estimator: total professional experience in years.
//!
//! Per entry, first match wins:
//! 1. explicit duration in the entry text ("3 months", "2 years", "6 weeks")
//! 2. project-complexity estimate from vocabulary (small / large / medium),
//!    with uncategorized text counted as a small project
//! 3. date range, scaled down when longer than 24 months
//!
//! Only a full-time role designation skips step 2 and goes to the date range.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::text::TermSet;
use crate::models::candidate::{DateMarker, ExperienceEntry};

pub const SMALL_PROJECT_MONTHS: f64 = 2.0;
pub const MEDIUM_PROJECT_MONTHS: f64 = 4.5;
pub const LARGE_PROJECT_MONTHS: f64 = 9.0;

/// Spans up to this many months are taken at face value.
const MAX_DIRECT_SPAN_MONTHS: f64 = 24.0;
const FULL_TIME_SPAN_FACTOR: f64 = 0.8;
const CONTRACT_SPAN_FACTOR: f64 = 0.25;

const WEEK_IN_MONTHS: f64 = 0.25;
const DAY_IN_MONTHS: f64 = 0.033;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*\+?\s*(years?|yrs?|months?|mos?|weeks?|wks?|days?)\b")
        .expect("duration pattern is valid")
});

const SMALL_PROJECT_VOCABULARY: &[&str] = &[
    "bug fix",
    "bug fixes",
    "bugfix",
    "hotfix",
    "landing page",
    "prototype",
    "proof of concept",
    "poc",
    "small project",
    "mini project",
    "script",
    "scripts",
    "plugin",
    "widget",
    "static website",
    "portfolio website",
    "assignment",
];

const LARGE_PROJECT_VOCABULARY: &[&str] = &[
    "enterprise",
    "large-scale",
    "large scale",
    "platform",
    "erp",
    "crm",
    "saas",
    "multi-tenant",
    "distributed system",
    "distributed systems",
    "migration",
];

const MEDIUM_PROJECT_VOCABULARY: &[&str] = &[
    "web application",
    "web app",
    "mobile app",
    "dashboard",
    "e-commerce",
    "ecommerce",
    "website",
    "management system",
    "portal",
    "api integration",
    "chatbot",
];

const COMPLEX_TECH_VOCABULARY: &[&str] = &[
    "full stack",
    "full-stack",
    "fullstack",
    "mern",
    "mean stack",
    "tech stack",
    "microservices",
    "react",
    "node.js",
    "django",
    "spring boot",
    "kubernetes",
];

const FULL_TIME_VOCABULARY: &[&str] = &[
    "engineer",
    "developer",
    "lead",
    "manager",
    "architect",
    "analyst",
    "consultant",
    "intern",
    "specialist",
    "administrator",
    "full-time",
    "full time",
    "permanent",
    "employee",
];

/// Marks a role as freelance or contract work: long spans are assumed to be mostly gaps.
const CONTRACT_VOCABULARY: &[&str] = &[
    "freelance",
    "freelancer",
    "contract",
    "contractor",
    "consultant",
    "consulting",
    "part-time",
    "part time",
    "self-employed",
    "gig",
];

static SMALL_PROJECT_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(SMALL_PROJECT_VOCABULARY));
static LARGE_PROJECT_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(LARGE_PROJECT_VOCABULARY));
static MEDIUM_PROJECT_TERMS: Lazy<TermSet> = Lazy::new(|| {
    TermSet::new(
        MEDIUM_PROJECT_VOCABULARY
            .iter()
            .chain(COMPLEX_TECH_VOCABULARY),
    )
});
static FULL_TIME_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(FULL_TIME_VOCABULARY));
static CONTRACT_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(CONTRACT_VOCABULARY));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectClass {
    Small,
    Medium,
    Large,
    /// A role designation with no project cue: measured by its dates instead.
    FullTimeRole,
}

impl ProjectClass {
    pub fn estimated_months(self) -> Option<f64> {
        match self {
            ProjectClass::Small => Some(SMALL_PROJECT_MONTHS),
            ProjectClass::Medium => Some(MEDIUM_PROJECT_MONTHS),
            ProjectClass::Large => Some(LARGE_PROJECT_MONTHS),
            ProjectClass::FullTimeRole => None,
        }
    }
}

/// How one entry contributed to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum EntryEstimate {
    Explicit { months: f64 },
    Project { class: ProjectClass, months: f64 },
    DateRange { span_months: f64, months: f64 },
    Skipped { reason: String },
}

impl EntryEstimate {
    pub fn months(&self) -> f64 {
        match self {
            EntryEstimate::Explicit { months }
            | EntryEstimate::Project { months, .. }
            | EntryEstimate::DateRange { months, .. } => *months,
            EntryEstimate::Skipped { .. } => 0.0,
        }
    }
}

/// Largest explicit duration mentioned in `text`, in months.
pub fn explicit_duration_months(text: &str) -> Option<f64> {
    DURATION_RE
        .captures_iter(&text.to_lowercase())
        .filter_map(|caps| {
            let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str();
            let months = if unit.starts_with('y') {
                amount * 12.0
            } else if unit.starts_with('m') {
                amount
            } else if unit.starts_with('w') {
                amount * WEEK_IN_MONTHS
            } else {
                amount * DAY_IN_MONTHS
            };
            Some(months)
        })
        .filter(|m| *m > 0.0)
        .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
}

/// Classifies an entry's text in fixed precedence order:
/// small → large → medium → complex tech (medium) → full-time role → small.
pub fn classify_project(text: &str) -> ProjectClass {
    if SMALL_PROJECT_TERMS.is_match(text) {
        ProjectClass::Small
    } else if LARGE_PROJECT_TERMS.is_match(text) {
        ProjectClass::Large
    } else if MEDIUM_PROJECT_TERMS.is_match(text) {
        ProjectClass::Medium
    } else if FULL_TIME_TERMS.is_match(text) {
        ProjectClass::FullTimeRole
    } else {
        ProjectClass::Small
    }
}

pub fn is_contract_work(text: &str) -> bool {
    CONTRACT_TERMS.is_match(text)
}

/// Whole months between two dates plus a day fraction, never negative.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct ExperienceEstimator {
    today: NaiveDate,
}

impl Default for ExperienceEstimator {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl ExperienceEstimator {
    /// `today` stands in for "present" and for missing end dates.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Total experience in years, rounded to 2 decimals.
    /// `None` only when no entry contributed any months.
    pub fn total_years(&self, entries: &[ExperienceEntry]) -> Option<f64> {
        let total_months: f64 = entries
            .iter()
            .map(|entry| self.estimate_entry(entry).months())
            .sum();

        if total_months > 0.0 {
            Some(round2(total_months / 12.0))
        } else {
            None
        }
    }

    pub fn estimate_entry(&self, entry: &ExperienceEntry) -> EntryEstimate {
        let text = entry.text();

        if let Some(months) = explicit_duration_months(&text) {
            return EntryEstimate::Explicit { months };
        }

        let class = classify_project(&text);
        match class.estimated_months() {
            Some(months) => EntryEstimate::Project { class, months },
            None => self.date_range_estimate(entry, &text),
        }
    }

    fn date_range_estimate(&self, entry: &ExperienceEntry, text: &str) -> EntryEstimate {
        let start = match &entry.start {
            DateMarker::Date(d) => *d,
            other => return self.skip(entry, format!("unusable start date {other:?}")),
        };
        let end = match entry.end.resolve_end(self.today) {
            Some(d) => d,
            None => return self.skip(entry, format!("unusable end date {:?}", entry.end)),
        };

        let span_months = months_between(start, end);
        if span_months <= 0.0 {
            return self.skip(entry, "empty date range".to_string());
        }

        let months = if span_months <= MAX_DIRECT_SPAN_MONTHS {
            span_months
        } else if is_contract_work(text) {
            span_months * CONTRACT_SPAN_FACTOR
        } else {
            span_months * FULL_TIME_SPAN_FACTOR
        };

        EntryEstimate::DateRange {
            span_months,
            months,
        }
    }

    fn skip(&self, entry: &ExperienceEntry, reason: String) -> EntryEstimate {
        debug!(role = %entry.role, company = %entry.company, %reason, "Skipping experience entry");
        EntryEstimate::Skipped { reason }
    }

    /// Tenure used for job stability: explicit duration text, else the date
    /// range to the end date (or today), never less than one month.
    /// `None` when the entry has neither.
    pub fn tenure_months(&self, entry: &ExperienceEntry) -> Option<f64> {
        let months = explicit_duration_months(&entry.text()).or_else(|| {
            let start = entry.start.as_date()?;
            let end = entry.end.resolve_end(self.today)?;
            Some(months_between(start, end))
        })?;
        Some(months.max(1.0))
    }
}
