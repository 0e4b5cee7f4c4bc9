use serde::{Deserialize, Serialize};

use crate::models::candidate::deserialize_skill_list;

/// A job posting as far as screening is concerned: a title and its required-skill keywords.
///
/// `keywords` accepts the same loose shapes as candidate skills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(
        default,
        alias = "required_skills",
        alias = "skills",
        deserialize_with = "deserialize_skill_list"
    )]
    pub keywords: Vec<String>,
}

impl JobPosting {
    #[cfg(test)]
    pub fn new<S: Into<String>>(title: Option<&str>, keywords: Vec<S>) -> Self {
        Self {
            title: title.map(str::to_string),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}
