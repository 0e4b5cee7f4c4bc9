//! Candidate data contract and the one-time normalization step that turns the
//! loosely-typed résumé payload into a single canonical shape.
//!
//! Only a structurally invalid record fails. Malformed sections degrade to empty
//! collections so downstream scoring sees zeros instead of errors.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ScreeningError;
use crate::matching::text::{join_lowercase, normalize};

/// Top-level keys every candidate record must carry, even if only as `null` or `[]`.
pub const REQUIRED_FIELDS: [&str; 4] = ["skills", "experience", "education", "certifications"];

const PRESENT_MARKERS: &[&str] = &[
    "present",
    "current",
    "currently",
    "now",
    "ongoing",
    "till date",
    "to date",
    "today",
];

// ────────────────────────────────────────────────────────────────────────────
// Canonical model
// ────────────────────────────────────────────────────────────────────────────

/// Start/end marker of an experience entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DateMarker {
    Date(NaiveDate),
    Present,
    Absent,
    Unparsed(String),
}

impl DateMarker {
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            None | Some("") => return DateMarker::Absent,
            Some(r) => r,
        };
        let lowered = raw.to_lowercase();
        if PRESENT_MARKERS.contains(&lowered.as_str()) {
            return DateMarker::Present;
        }
        match parse_loose_date(&lowered) {
            Some(date) => DateMarker::Date(date),
            None => DateMarker::Unparsed(raw.to_string()),
        }
    }

    /// Resolves to a calendar date; `Present` and `Absent` resolve to `today`.
    pub fn resolve_end(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateMarker::Date(d) => Some(*d),
            DateMarker::Present | DateMarker::Absent => Some(today),
            DateMarker::Unparsed(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateMarker::Date(d) => Some(*d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub start: DateMarker,
    pub end: DateMarker,
    pub description: String,
}

impl ExperienceEntry {
    /// Lower-cased description + role + company, the text the heuristics scan.
    pub fn text(&self) -> String {
        join_lowercase([
            self.description.as_str(),
            self.role.as_str(),
            self.company.as_str(),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
    pub institution: String,
}

impl EducationEntry {
    pub fn text(&self) -> String {
        join_lowercase([
            self.degree.as_str(),
            self.field.as_str(),
            self.institution.as_str(),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
}

impl Certification {
    pub fn text(&self) -> String {
        join_lowercase([self.name.as_str(), self.issuer.as_deref().unwrap_or("")])
    }
}

/// A candidate record after boundary normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<Certification>,
}

impl CandidateProfile {
    /// Normalizes an untrusted candidate payload.
    ///
    /// Fails only when `value` is not an object or misses one of `REQUIRED_FIELDS`.
    pub fn from_value(value: &Value) -> Result<Self, ScreeningError> {
        let obj = value.as_object().ok_or(ScreeningError::NotAnObject)?;
        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(ScreeningError::MissingField(field));
            }
        }

        Ok(CandidateProfile {
            name: text_field(obj, &["name", "full_name"]),
            email: text_field(obj, &["email"]),
            summary: text_field(obj, &["summary", "profile", "objective"]),
            skills: skill_list(&obj["skills"]),
            experience: records(&obj["experience"], "experience")
                .into_iter()
                .filter_map(experience_entry)
                .collect(),
            education: education_list(&obj["education"]),
            certifications: certification_list(&obj["certifications"]),
        })
    }

    /// Lower-cased free text scanned by skill inference: summary, every experience
    /// entry's role/description/company, education and certification text.
    pub fn evidence_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(summary) = &self.summary {
            parts.push(summary.to_lowercase());
        }
        parts.extend(self.experience.iter().map(ExperienceEntry::text));
        parts.extend(self.education.iter().map(EducationEntry::text));
        parts.extend(self.certifications.iter().map(Certification::text));
        join_lowercase(parts.iter().map(String::as_str))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shape of an untrusted field
// ────────────────────────────────────────────────────────────────────────────

/// The shapes a loosely-typed résumé field shows up in.
enum FieldShape<'a> {
    Empty,
    Text(&'a str),
    List(&'a [Value]),
    Record(&'a Map<String, Value>),
    Scalar(String),
}

impl<'a> FieldShape<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => FieldShape::Empty,
            Value::String(s) => FieldShape::Text(s),
            Value::Array(items) => FieldShape::List(items),
            Value::Object(map) => FieldShape::Record(map),
            Value::Number(n) => FieldShape::Scalar(n.to_string()),
            Value::Bool(b) => FieldShape::Scalar(b.to_string()),
        }
    }
}

/// Flattens any of the accepted skill shapes into a de-duplicated, ordered list.
///
/// Accepted: list of strings, list of `{name|skill}` records, a delimited string,
/// a map of category → any of the above, or `null`.
pub fn skill_list(value: &Value) -> Vec<String> {
    let mut raw = Vec::new();
    collect_skills(value, &mut raw);

    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|s| seen.insert(normalize(s)))
        .collect()
}

fn collect_skills(value: &Value, out: &mut Vec<String>) {
    match FieldShape::of(value) {
        FieldShape::Empty | FieldShape::Scalar(_) => {}
        FieldShape::Text(text) => out.extend(split_delimited(text)),
        FieldShape::List(items) => {
            for item in items {
                collect_skills(item, out);
            }
        }
        FieldShape::Record(map) => match text_field(map, &["name", "skill"]) {
            Some(name) => out.extend(split_delimited(&name)),
            None => {
                for nested in map.values() {
                    collect_skills(nested, out);
                }
            }
        },
    }
}

fn split_delimited(text: &str) -> Vec<String> {
    text.split(|c| matches!(c, ',' | ';' | '|' | '\n'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserializer adapter so serde-driven request types can reuse `skill_list`.
pub fn deserialize_skill_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(skill_list(&value))
}

/// Wraps a single record in a one-element list; anything else non-list is dropped.
fn records<'a>(value: &'a Value, section: &str) -> Vec<&'a Value> {
    match FieldShape::of(value) {
        FieldShape::List(items) => items.iter().collect(),
        FieldShape::Record(_) | FieldShape::Text(_) => vec![value],
        FieldShape::Empty => vec![],
        FieldShape::Scalar(s) => {
            warn!(section, value = %s, "Ignoring malformed section");
            vec![]
        }
    }
}

fn experience_entry(value: &Value) -> Option<ExperienceEntry> {
    let map = match FieldShape::of(value) {
        FieldShape::Record(map) => map,
        FieldShape::Text(text) => {
            return Some(ExperienceEntry {
                role: String::new(),
                company: String::new(),
                start: DateMarker::Absent,
                end: DateMarker::Absent,
                description: text.to_string(),
            })
        }
        _ => {
            warn!("Skipping malformed experience entry");
            return None;
        }
    };

    Some(ExperienceEntry {
        role: text_field(map, &["role", "title", "position"]).unwrap_or_default(),
        company: text_field(map, &["company", "organization", "employer"]).unwrap_or_default(),
        start: DateMarker::parse(text_field(map, &["start_date", "start"]).as_deref()),
        end: DateMarker::parse(text_field(map, &["end_date", "end"]).as_deref()),
        description: text_field(
            map,
            &["description", "responsibilities", "details", "summary"],
        )
        .unwrap_or_default(),
    })
}

fn education_list(value: &Value) -> Vec<EducationEntry> {
    records(value, "education")
        .into_iter()
        .filter_map(|record| match FieldShape::of(record) {
            FieldShape::Text(text) => Some(EducationEntry {
                degree: text.to_string(),
                ..EducationEntry::default()
            }),
            FieldShape::Record(map) => Some(EducationEntry {
                degree: text_field(map, &["degree", "qualification"]).unwrap_or_default(),
                field: text_field(map, &["field", "major", "field_of_study"]).unwrap_or_default(),
                institution: text_field(map, &["institution", "school", "university"])
                    .unwrap_or_default(),
            }),
            _ => None,
        })
        .filter(|e| !e.text().is_empty())
        .collect()
}

fn certification_list(value: &Value) -> Vec<Certification> {
    records(value, "certifications")
        .into_iter()
        .flat_map(|record| match FieldShape::of(record) {
            FieldShape::Text(text) => split_delimited(text)
                .into_iter()
                .map(|name| Certification { name, issuer: None })
                .collect(),
            FieldShape::Record(map) => text_field(map, &["name", "title", "certification"])
                .map(|name| {
                    vec![Certification {
                        name,
                        issuer: text_field(map, &["issuer", "organization", "authority"]),
                    }]
                })
                .unwrap_or_default(),
            _ => vec![],
        })
        .collect()
}

/// First present key among `keys`, rendered as text. Lists of strings are joined
/// by newlines; numbers are stringified; empty strings count as absent.
fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| {
            let text = match FieldShape::of(value) {
                FieldShape::Text(s) => s.trim().to_string(),
                FieldShape::Scalar(s) => s,
                FieldShape::List(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
                FieldShape::Empty | FieldShape::Record(_) => String::new(),
            };
            (!text.is_empty()).then_some(text)
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Date parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses the date spellings résumés actually use. Month-only dates land on the 1st.
fn parse_loose_date(lowered: &str) -> Option<NaiveDate> {
    let cleaned = lowered
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let s = cleaned.as_str();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }

    let month_first = [
        (format!("{s}-01"), "%Y-%m-%d"),
        (format!("{s}/01"), "%Y/%m/%d"),
        (format!("01/{s}"), "%d/%m/%Y"),
        (format!("01-{s}"), "%d-%m-%Y"),
        (format!("01 {s}"), "%d %b %Y"),
        (format!("01 {s}"), "%d %B %Y"),
    ];
    for (candidate, fmt) in &month_first {
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return Some(d);
        }
    }

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_required_field_is_hard_failure() {
        let value = json!({"skills": [], "experience": [], "education": []});
        let err = CandidateProfile::from_value(&value).unwrap_err();
        assert!(matches!(err, ScreeningError::MissingField("certifications")));
    }

    #[test]
    fn test_non_object_is_hard_failure() {
        let err = CandidateProfile::from_value(&json!(["python"])).unwrap_err();
        assert!(matches!(err, ScreeningError::NotAnObject));
    }

    #[test]
    fn test_null_placeholders_are_accepted() {
        let value = json!({
            "skills": null, "experience": null, "education": null, "certifications": null
        });
        let profile = CandidateProfile::from_value(&value).unwrap();
        assert!(profile.skills.is_empty());
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
        assert!(profile.certifications.is_empty());
    }

    #[test]
    fn test_malformed_sections_degrade_to_empty() {
        let value = json!({
            "skills": 42, "experience": true, "education": 7, "certifications": 3.5
        });
        let profile = CandidateProfile::from_value(&value).unwrap();
        assert_eq!(profile, CandidateProfile::default());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_malformed_section_is_logged_at_warn() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let value = json!({
                "skills": [], "experience": true, "education": [], "certifications": []
            });
            CandidateProfile::from_value(&value).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Ignoring malformed section"));
        assert!(output.contains("experience"));
    }

    #[test]
    fn test_skill_shapes_are_flattened_and_deduplicated() {
        assert_eq!(
            skill_list(&json!("Python, Django; SQL | python\nDocker")),
            vec!["Python", "Django", "SQL", "Docker"]
        );
        assert_eq!(
            skill_list(&json!([{"name": "Rust"}, {"skill": "Go"}, "rust", ["Kafka"]])),
            vec!["Rust", "Go", "Kafka"]
        );
        let grouped = skill_list(&json!({
            "languages": ["Python", "Java"],
            "databases": "MySQL, Redis"
        }));
        assert_eq!(grouped.len(), 4);
        assert!(grouped.contains(&"Redis".to_string()));
    }

    #[test]
    fn test_experience_aliases_and_description_lines() {
        let value = json!({
            "skills": [],
            "experience": {
                "title": "Backend Engineer",
                "employer": "Acme",
                "start": "Jan 2020",
                "end": "Present",
                "description": ["Built APIs", "Ran on-call"]
            },
            "education": [],
            "certifications": []
        });
        let profile = CandidateProfile::from_value(&value).unwrap();
        let entry = &profile.experience[0];
        assert_eq!(entry.role, "Backend Engineer");
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.start, DateMarker::Date(ymd(2020, 1, 1)));
        assert_eq!(entry.end, DateMarker::Present);
        assert_eq!(entry.description, "Built APIs\nRan on-call");
    }

    #[test]
    fn test_education_and_certification_shapes() {
        let value = json!({
            "skills": [],
            "experience": [],
            "education": "BSc Computer Science",
            "certifications": [
                "AWS Solutions Architect",
                {"title": "CKA", "issuer": "CNCF"},
                {"issuer": "nameless"}
            ]
        });
        let profile = CandidateProfile::from_value(&value).unwrap();
        assert_eq!(profile.education[0].degree, "BSc Computer Science");
        assert_eq!(profile.certifications.len(), 2);
        assert_eq!(profile.certifications[1].issuer.as_deref(), Some("CNCF"));
    }

    #[test]
    fn test_date_marker_formats() {
        assert_eq!(DateMarker::parse(Some("2021-03-15")), DateMarker::Date(ymd(2021, 3, 15)));
        assert_eq!(DateMarker::parse(Some("2021-03")), DateMarker::Date(ymd(2021, 3, 1)));
        assert_eq!(DateMarker::parse(Some("2021/03")), DateMarker::Date(ymd(2021, 3, 1)));
        assert_eq!(DateMarker::parse(Some("03/2021")), DateMarker::Date(ymd(2021, 3, 1)));
        assert_eq!(DateMarker::parse(Some("Mar 2021")), DateMarker::Date(ymd(2021, 3, 1)));
        assert_eq!(DateMarker::parse(Some("March, 2021")), DateMarker::Date(ymd(2021, 3, 1)));
        assert_eq!(DateMarker::parse(Some("2019")), DateMarker::Date(ymd(2019, 1, 1)));
    }

    #[test]
    fn test_date_marker_present_absent_unparsed() {
        assert_eq!(DateMarker::parse(Some("Present")), DateMarker::Present);
        assert_eq!(DateMarker::parse(Some("till date")), DateMarker::Present);
        assert_eq!(DateMarker::parse(None), DateMarker::Absent);
        assert_eq!(DateMarker::parse(Some("   ")), DateMarker::Absent);
        assert_eq!(
            DateMarker::parse(Some("sometime last year")),
            DateMarker::Unparsed("sometime last year".to_string())
        );
    }

    #[test]
    fn test_resolve_end_defaults_to_today() {
        let today = ymd(2024, 6, 1);
        assert_eq!(DateMarker::Present.resolve_end(today), Some(today));
        assert_eq!(DateMarker::Absent.resolve_end(today), Some(today));
        assert_eq!(DateMarker::Unparsed("x".into()).resolve_end(today), None);
    }

    #[test]
    fn test_evidence_text_covers_all_sources() {
        let profile = CandidateProfile {
            summary: Some("Mentored juniors".to_string()),
            experience: vec![ExperienceEntry {
                role: "Engineer".to_string(),
                company: "Initech".to_string(),
                start: DateMarker::Absent,
                end: DateMarker::Absent,
                description: "Shipped Docker images".to_string(),
            }],
            education: vec![EducationEntry {
                degree: "BSc".to_string(),
                field: "Physics".to_string(),
                institution: "MIT".to_string(),
            }],
            certifications: vec![Certification {
                name: "CKA".to_string(),
                issuer: Some("CNCF".to_string()),
            }],
            ..CandidateProfile::default()
        };
        let text = profile.evidence_text();
        for needle in ["mentored", "docker", "initech", "physics", "mit", "cncf"] {
            assert!(text.contains(needle), "missing {needle} in {text}");
        }
    }
}
