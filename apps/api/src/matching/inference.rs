//! Skill inference: derives skills the candidate demonstrably has but did not list.
//!
//! Pass 1 (contextual) scans free-text evidence for trigger vocabulary.
//! Pass 2 (stack) looks at the explicit + inferred skills for co-occurring stack
//! signals and adds the competencies that stack implies.
//!
//! Both passes are additive: nothing is removed, and a skill already in the
//! running set (case-insensitive) is never added twice.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::taxonomy::SkillTaxonomy;
use crate::matching::text::{normalize, TermSet};
use crate::models::candidate::CandidateProfile;

// ────────────────────────────────────────────────────────────────────────────
// Candidate skill set
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Explicit,
    Inferred,
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub provenance: Provenance,
}

/// Explicit ∪ inferred ∪ stack-related skills, unique by normalized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSkillSet {
    records: Vec<SkillRecord>,
    seen: HashSet<String>,
}

impl CandidateSkillSet {
    pub fn from_explicit<S: AsRef<str>>(skills: &[S]) -> Self {
        let mut set = Self::default();
        for skill in skills {
            set.insert(skill.as_ref(), Provenance::Explicit);
        }
        set
    }

    /// Adds `name` unless an equal normalized term is already present.
    pub fn insert(&mut self, name: &str, provenance: Provenance) -> bool {
        let key = normalize(name);
        if key.is_empty() || !self.seen.insert(key) {
            return false;
        }
        self.records.push(SkillRecord {
            name: name.trim().to_string(),
            provenance,
        });
        true
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every skill name, in insertion order (explicit first).
    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn with_provenance(&self, provenance: Provenance) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.provenance == provenance)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Inferred and stack-related skills, i.e. everything not given explicitly.
    pub fn derived(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.provenance != Provenance::Explicit)
            .map(|r| r.name.clone())
            .collect()
    }

    fn add_all(&mut self, names: &[&str], provenance: Provenance, rule: &str) {
        for name in names {
            if self.insert(name, provenance) {
                debug!(rule, skill = %name, "Inferred skill");
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Contextual rules
// ────────────────────────────────────────────────────────────────────────────

const AI_VOCABULARY: &[&str] = &[
    "llm",
    "llms",
    "large language model",
    "large language models",
    "gpt",
    "chatgpt",
    "openai",
    "langchain",
    "llamaindex",
    "generative ai",
    "genai",
    "prompt engineering",
    "rag",
    "retrieval augmented generation",
    "hugging face",
    "huggingface",
    "fine-tuning",
    "fine tuning",
];

const TRANSFORMER_VOCABULARY: &[&str] = &[
    "transformer",
    "transformers",
    "bert",
    "gpt",
    "gpt-3",
    "gpt-4",
    "attention mechanism",
];

const BACKEND_VOCABULARY: &[&str] = &[
    "backend",
    "back-end",
    "back end",
    "api",
    "apis",
    "rest api",
    "restful",
    "microservice",
    "microservices",
    "server-side",
    "server side",
];

const LEADERSHIP_VOCABULARY: &[&str] = &[
    "mentored",
    "taught",
    "trained",
    "led team",
    "led a team",
    "led the team",
    "managed team",
    "managed a team",
    "managed the team",
    "presented to",
    "director of",
];

const CONTAINER_VOCABULARY: &[&str] = &[
    "docker",
    "dockerized",
    "dockerfile",
    "docker-compose",
    "docker compose",
    "container",
    "containers",
    "containerized",
    "containerization",
];

const CICD_VOCABULARY: &[&str] = &[
    "ci/cd",
    "cicd",
    "ci-cd",
    "continuous integration",
    "continuous deployment",
    "continuous delivery",
    "github actions",
    "gitlab ci",
    "jenkins",
    "circleci",
];

const CLOUD_VOCABULARY: &[&str] = &[
    "aws",
    "amazon web services",
    "azure",
    "gcp",
    "google cloud",
];

const AGILE_VOCABULARY: &[&str] = &["agile", "scrum", "kanban", "sprint", "sprints"];

/// A contextual rule fires when every vocabulary group has at least one hit.
struct ContextRule {
    label: &'static str,
    groups: &'static [&'static [&'static str]],
    adds: &'static [&'static str],
}

const CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        label: "mern",
        groups: &[&["mern"], &["mern stack"]],
        adds: &["MongoDB", "Express.js", "React", "Node.js"],
    },
    ContextRule {
        label: "ai",
        groups: &[AI_VOCABULARY],
        adds: &["LLMs", "NLP"],
    },
    ContextRule {
        label: "transformers",
        groups: &[AI_VOCABULARY, TRANSFORMER_VOCABULARY],
        adds: &["Transformers"],
    },
    ContextRule {
        label: "backend",
        groups: &[BACKEND_VOCABULARY],
        adds: &["Node.js", "API Design"],
    },
    ContextRule {
        label: "leadership",
        groups: &[LEADERSHIP_VOCABULARY],
        adds: &["Communication", "Leadership"],
    },
    ContextRule {
        label: "containers",
        groups: &[CONTAINER_VOCABULARY],
        adds: &["Docker", "Containerization"],
    },
    ContextRule {
        label: "ci_cd",
        groups: &[CICD_VOCABULARY],
        adds: &["CI/CD"],
    },
    ContextRule {
        label: "cloud",
        groups: &[CLOUD_VOCABULARY],
        adds: &["Cloud Computing"],
    },
    ContextRule {
        label: "agile",
        groups: &[AGILE_VOCABULARY],
        adds: &["Agile"],
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Stack rules
// ────────────────────────────────────────────────────────────────────────────

const MERN_SIGNALS: &[&[&str]] = &[
    &["mongodb", "mongo"],
    &["express", "express.js", "expressjs"],
    &[
        "react", "react.js", "reactjs", "angular", "angularjs", "vue", "vue.js", "vuejs",
    ],
    &["node.js", "nodejs", "node"],
];

const STACK_NAMES: &[&str] = &["mern", "mean", "mevn"];

/// Signals needed before the JavaScript full-stack bundle applies.
const MIN_MERN_SIGNALS: usize = 3;

const FULL_STACK_COMPETENCIES: &[&str] = &[
    "Backend Business Logic",
    "Database Management",
    "CRUD Operations",
    "Authentication",
    "Authorization",
    "Frontend-Backend Integration",
    "Debugging",
    "Performance Optimization",
    "Deployment",
    "Clean Code Practices",
    "Scalable Architecture",
    "ES6+",
];

const BACKEND_COMPETENCIES: &[&str] = &[
    "Backend Business Logic",
    "Database Management",
    "CRUD Operations",
    "Authentication",
    "Authorization",
    "Debugging",
    "Performance Optimization",
    "Deployment",
    "Clean Code Practices",
    "Scalable Architecture",
];

struct StackProfile {
    label: &'static str,
    triggers: &'static [&'static str],
    extras: &'static [&'static str],
}

const SERVER_STACKS: &[StackProfile] = &[
    StackProfile {
        label: "python_web",
        triggers: &["django", "flask", "fastapi"],
        extras: &["ORM", "REST API"],
    },
    StackProfile {
        label: "dotnet",
        triggers: &[
            "asp.net",
            "asp.net core",
            ".net core",
            ".net",
            "dotnet",
            "entity framework",
        ],
        extras: &["LINQ"],
    },
    StackProfile {
        label: "spring",
        triggers: &["spring", "spring boot", "springboot", "hibernate"],
        extras: &["JPA"],
    },
    StackProfile {
        label: "laravel",
        triggers: &["laravel", "symfony"],
        extras: &["Eloquent ORM"],
    },
];

const FRONTEND_FRAMEWORKS: &[&str] = &[
    "react", "react.js", "reactjs", "angular", "angularjs", "vue", "vue.js", "vuejs", "svelte",
    "next.js", "nextjs",
];

const BACKEND_FRAMEWORKS: &[&str] = &[
    "express",
    "express.js",
    "expressjs",
    "nestjs",
    "django",
    "flask",
    "fastapi",
    "spring",
    "spring boot",
    "laravel",
    "asp.net",
    "rails",
    "ruby on rails",
];

const MIN_DATABASE_MENTIONS: usize = 2;

// Rule vocabularies compiled once per process.
static CONTEXT_RULE_TERMS: Lazy<Vec<(&'static ContextRule, Vec<TermSet>)>> = Lazy::new(|| {
    CONTEXT_RULES
        .iter()
        .map(|rule| (rule, rule.groups.iter().map(|g| TermSet::new(*g)).collect()))
        .collect()
});
static MERN_SIGNAL_TERMS: Lazy<Vec<TermSet>> =
    Lazy::new(|| MERN_SIGNALS.iter().map(|g| TermSet::new(*g)).collect());
static STACK_NAME_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(STACK_NAMES));
static SERVER_STACK_TERMS: Lazy<Vec<(&'static StackProfile, TermSet)>> = Lazy::new(|| {
    SERVER_STACKS
        .iter()
        .map(|stack| (stack, TermSet::new(stack.triggers)))
        .collect()
});
static FRONTEND_FRAMEWORK_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(FRONTEND_FRAMEWORKS));
static BACKEND_FRAMEWORK_TERMS: Lazy<TermSet> = Lazy::new(|| TermSet::new(BACKEND_FRAMEWORKS));

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct SkillInferenceEngine<'a> {
    taxonomy: &'a SkillTaxonomy,
}

impl<'a> SkillInferenceEngine<'a> {
    pub fn new(taxonomy: &'a SkillTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// Runs both passes over a normalized profile.
    pub fn infer(&self, profile: &CandidateProfile) -> CandidateSkillSet {
        let mut set = CandidateSkillSet::from_explicit(&profile.skills);
        self.infer_contextual(&profile.evidence_text(), &mut set);
        self.infer_stack(&mut set);
        set
    }

    /// Pass 1: fires every contextual rule whose vocabulary groups all hit `text`.
    pub fn infer_contextual(&self, text: &str, set: &mut CandidateSkillSet) {
        let text = text.to_lowercase();
        for (rule, groups) in CONTEXT_RULE_TERMS.iter() {
            if groups.iter().all(|group| group.is_match(&text)) {
                set.add_all(rule.adds, Provenance::Inferred, rule.label);
            }
        }
    }

    /// Pass 2: stack-implied competencies over the current (explicit + inferred) skills.
    pub fn infer_stack(&self, set: &mut CandidateSkillSet) {
        let names = set.names();
        let joined = names
            .iter()
            .map(|n| n.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");

        let database_mentions = names
            .iter()
            .filter(|n| self.taxonomy.is_database_term(n))
            .map(|n| normalize(n))
            .collect::<HashSet<_>>()
            .len();

        let mern_signals = MERN_SIGNAL_TERMS
            .iter()
            .filter(|group| group.is_match(&joined))
            .count();
        if mern_signals >= MIN_MERN_SIGNALS || STACK_NAME_TERMS.is_match(&joined) {
            set.add_all(FULL_STACK_COMPETENCIES, Provenance::Stack, "js_full_stack");
        }

        for (stack, triggers) in SERVER_STACK_TERMS.iter() {
            if triggers.is_match(&joined) {
                set.add_all(BACKEND_COMPETENCIES, Provenance::Stack, stack.label);
                set.add_all(stack.extras, Provenance::Stack, stack.label);
            }
        }

        if FRONTEND_FRAMEWORK_TERMS.is_match(&joined) {
            set.add_all(
                &["Frontend-Backend API Integration", "State Management"],
                Provenance::Stack,
                "frontend_framework",
            );
        }

        if BACKEND_FRAMEWORK_TERMS.is_match(&joined) {
            set.add_all(
                &["Backend Business Logic", "API Design", "CRUD Operations"],
                Provenance::Stack,
                "backend_framework",
            );
        }

        if database_mentions >= MIN_DATABASE_MENTIONS {
            set.add_all(
                &["Database Management", "CRUD Operations"],
                Provenance::Stack,
                "databases",
            );
        }
    }
}
