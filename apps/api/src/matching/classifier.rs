//! Match classifier: decides whether a candidate skill satisfies a job keyword.
//!
//! Evaluation order is EXACT → RELATED → NONE. A substring hit is promoted to
//! EXACT only when the pair is not already linked through the equivalence table.

use serde::{Deserialize, Serialize};

use crate::matching::taxonomy::SkillTaxonomy;
use crate::matching::text::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Exact,
    Related,
    None,
}

/// A job keyword that was satisfied, and by which candidate skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub candidate_skill: String,
    pub outcome: MatchOutcome,
}

/// Every job keyword lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordPartition {
    pub exact: Vec<KeywordMatch>,
    pub related: Vec<KeywordMatch>,
    pub missing: Vec<String>,
}

impl KeywordPartition {
    pub fn total(&self) -> usize {
        self.exact.len() + self.related.len() + self.missing.len()
    }

    /// Exact and related matches, exact first.
    pub fn matched(&self) -> Vec<KeywordMatch> {
        self.exact.iter().chain(self.related.iter()).cloned().collect()
    }
}

pub struct MatchClassifier<'a> {
    taxonomy: &'a SkillTaxonomy,
}

impl<'a> MatchClassifier<'a> {
    pub fn new(taxonomy: &'a SkillTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn classify(&self, skill: &str, keyword: &str) -> MatchOutcome {
        let skill = normalize(skill);
        let keyword = normalize(keyword);

        if skill == keyword {
            return MatchOutcome::Exact;
        }

        let equivalent = self.taxonomy.are_equivalent(&skill, &keyword);

        let substring = !skill.is_empty()
            && !keyword.is_empty()
            && (skill.contains(keyword.as_str()) || keyword.contains(skill.as_str()));
        if substring && !equivalent {
            return MatchOutcome::Exact;
        }

        if equivalent || self.same_database_category(&skill, &keyword) {
            return MatchOutcome::Related;
        }

        MatchOutcome::None
    }

    fn same_database_category(&self, skill: &str, keyword: &str) -> bool {
        match (
            self.taxonomy.database_category(skill),
            self.taxonomy.database_category(keyword),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Resolves each keyword against the candidate's skills: the first EXACT
    /// skill wins, else the first RELATED one, else the keyword is missing.
    pub fn partition<S: AsRef<str>, K: AsRef<str>>(
        &self,
        skills: &[S],
        keywords: &[K],
    ) -> KeywordPartition {
        let mut partition = KeywordPartition::default();

        for keyword in keywords {
            let keyword = keyword.as_ref();
            let mut first_related: Option<&str> = None;
            let mut exact: Option<&str> = None;

            for skill in skills {
                let skill = skill.as_ref();
                match self.classify(skill, keyword) {
                    MatchOutcome::Exact => {
                        exact = Some(skill);
                        break;
                    }
                    MatchOutcome::Related if first_related.is_none() => {
                        first_related = Some(skill);
                    }
                    _ => {}
                }
            }

            match (exact, first_related) {
                (Some(skill), _) => partition.exact.push(KeywordMatch {
                    keyword: keyword.to_string(),
                    candidate_skill: skill.to_string(),
                    outcome: MatchOutcome::Exact,
                }),
                (None, Some(skill)) => partition.related.push(KeywordMatch {
                    keyword: keyword.to_string(),
                    candidate_skill: skill.to_string(),
                    outcome: MatchOutcome::Related,
                }),
                (None, None) => partition.missing.push(keyword.to_string()),
            }
        }

        partition
    }
}
