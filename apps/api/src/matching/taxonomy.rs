//! Skill taxonomy: equivalence classes plus the database-type categorization.
//!
//! Built once at startup (`SkillTaxonomy::standard()`) and shared read-only as an
//! `Arc<SkillTaxonomy>`. Tests construct small fixture taxonomies with `SkillTaxonomy::new`.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::matching::text::normalize;

/// A canonical skill plus the variants treated as interchangeable with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquivalenceClass {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl EquivalenceClass {
    pub fn new(canonical: &str, variants: &[&str]) -> Self {
        Self {
            canonical: normalize(canonical),
            variants: variants.iter().map(|v| normalize(v)).collect(),
        }
    }

    fn members(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.canonical).chain(self.variants.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseCategory {
    Relational,
    NonRelational,
    Vector,
    KeyValue,
    Graph,
    TimeSeries,
    Search,
}

/// Immutable skill taxonomy.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    classes: Vec<EquivalenceClass>,
    categories: Vec<(DatabaseCategory, Vec<String>)>,
    /// normalized term → indices of every class it appears in (canonical or variant)
    class_index: HashMap<String, Vec<usize>>,
    /// normalized term → category, exact membership only
    category_index: HashMap<String, DatabaseCategory>,
    /// Shortest term allowed in substring category lookups. 1 admits every term.
    min_substring_len: usize,
}

impl SkillTaxonomy {
    pub fn new(
        classes: Vec<EquivalenceClass>,
        categories: Vec<(DatabaseCategory, Vec<String>)>,
    ) -> Self {
        let categories: Vec<(DatabaseCategory, Vec<String>)> = categories
            .into_iter()
            .map(|(cat, terms)| (cat, terms.iter().map(|t| normalize(t)).collect()))
            .collect();

        let mut class_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, class) in classes.iter().enumerate() {
            for member in class.members() {
                let slots = class_index.entry(member.clone()).or_default();
                if !slots.contains(&idx) {
                    slots.push(idx);
                }
            }
        }

        let mut category_index = HashMap::new();
        for (cat, terms) in &categories {
            for term in terms {
                category_index.entry(term.clone()).or_insert(*cat);
            }
        }

        Self {
            classes,
            categories,
            class_index,
            category_index,
            min_substring_len: 1,
        }
    }

    /// Keeps terms shorter than `len` characters out of substring category
    /// lookups; exact membership is unaffected. Off unless set.
    pub fn with_min_substring_len(mut self, len: usize) -> Self {
        self.min_substring_len = len.max(1);
        self
    }

    /// The term itself plus every member of each equivalence class it belongs to,
    /// whether it was found in the canonical or in a variant position.
    pub fn equivalents(&self, term: &str) -> BTreeSet<String> {
        let term = normalize(term);
        let mut out = BTreeSet::new();
        if let Some(indices) = self.class_index.get(&term) {
            for &idx in indices {
                out.extend(self.classes[idx].members().cloned());
            }
        }
        out.insert(term);
        out
    }

    /// True when `a` and `b` are linked purely through the equivalence table.
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        let (a, b) = (normalize(a), normalize(b));
        self.equivalents(&b).contains(&a) || self.equivalents(&a).contains(&b)
    }

    /// Category of a database term by exact membership, else by substring
    /// containment in either direction. Among substring hits the longest member
    /// wins, so "nosql store" lands in non-relational rather than under "sql";
    /// equal lengths keep table order.
    pub fn database_category(&self, term: &str) -> Option<DatabaseCategory> {
        let term = normalize(term);
        if term.is_empty() {
            return None;
        }
        if let Some(cat) = self.category_index.get(&term) {
            return Some(*cat);
        }
        if term.len() < self.min_substring_len {
            return None;
        }

        let mut best: Option<(usize, DatabaseCategory)> = None;
        for (cat, members) in &self.categories {
            for member in members {
                if member.len() < self.min_substring_len {
                    continue;
                }
                if term.contains(member.as_str()) || member.contains(term.as_str()) {
                    let len = member.len();
                    if best.map_or(true, |(best_len, _)| len > best_len) {
                        best = Some((len, *cat));
                    }
                }
            }
        }
        best.map(|(_, cat)| cat)
    }

    pub fn is_database_term(&self, term: &str) -> bool {
        self.database_category(term).is_some()
    }

    /// The taxonomy used in production.
    pub fn standard() -> Self {
        Self::new(standard_classes(), standard_categories())
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_classes() -> Vec<EquivalenceClass> {
    vec![
        EquivalenceClass::new(
            "javascript",
            &["js", "es6", "es6+", "ecmascript", "vanilla js"],
        ),
        EquivalenceClass::new("typescript", &["ts"]),
        EquivalenceClass::new(
            "python",
            &["py", "django", "flask", "fastapi", "pandas", "numpy"],
        ),
        EquivalenceClass::new(
            "java",
            &["spring", "spring boot", "springboot", "hibernate", "jpa", "j2ee"],
        ),
        EquivalenceClass::new(
            "c#",
            &[
                ".net",
                "asp.net",
                "dotnet",
                ".net core",
                "asp.net core",
                "entity framework",
                "linq",
                "blazor",
            ],
        ),
        EquivalenceClass::new("php", &["laravel", "symfony", "codeigniter"]),
        EquivalenceClass::new("golang", &["go"]),
        EquivalenceClass::new(
            "node.js",
            &["nodejs", "node", "express", "express.js", "expressjs", "nestjs"],
        ),
        EquivalenceClass::new(
            "react",
            &["react.js", "reactjs", "next.js", "nextjs", "redux"],
        ),
        EquivalenceClass::new("react native", &["expo"]),
        EquivalenceClass::new("angular", &["angularjs", "angular.js"]),
        EquivalenceClass::new("vue", &["vue.js", "vuejs", "nuxt", "nuxt.js"]),
        EquivalenceClass::new("html", &["html5"]),
        EquivalenceClass::new("css", &["css3", "sass", "scss", "tailwind", "bootstrap"]),
        EquivalenceClass::new(
            "aws",
            &["amazon web services", "ec2", "s3", "lambda", "cloudformation"],
        ),
        EquivalenceClass::new("azure", &["microsoft azure"]),
        EquivalenceClass::new("gcp", &["google cloud", "google cloud platform"]),
        EquivalenceClass::new(
            "docker",
            &["containers", "containerization", "docker compose", "docker-compose"],
        ),
        EquivalenceClass::new("kubernetes", &["k8s", "eks", "aks", "gke", "helm"]),
        EquivalenceClass::new(
            "ci/cd",
            &[
                "cicd",
                "jenkins",
                "github actions",
                "gitlab ci",
                "circleci",
                "continuous integration",
                "continuous deployment",
            ],
        ),
        EquivalenceClass::new(
            "sql",
            &[
                "mysql",
                "postgresql",
                "postgres",
                "sql server",
                "ms sql",
                "mssql",
                "sqlite",
                "mariadb",
                "t-sql",
                "pl/sql",
            ],
        ),
        EquivalenceClass::new(
            "nosql",
            &["mongodb", "mongo", "cassandra", "dynamodb", "couchdb", "firebase"],
        ),
        EquivalenceClass::new(
            "machine learning",
            &["ml", "deep learning", "tensorflow", "pytorch", "scikit-learn", "keras"],
        ),
        EquivalenceClass::new(
            "llms",
            &["llm", "large language models", "generative ai", "openai", "langchain"],
        ),
        EquivalenceClass::new(
            "nlp",
            &["natural language processing", "transformers", "bert", "spacy", "nltk"],
        ),
        EquivalenceClass::new(
            "rest api",
            &["rest", "restful", "restful api", "api design", "api development"],
        ),
        EquivalenceClass::new("git", &["github", "gitlab", "bitbucket", "version control"]),
        EquivalenceClass::new("agile", &["scrum", "kanban", "sprint planning"]),
        EquivalenceClass::new("linux", &["unix", "ubuntu", "bash", "shell scripting"]),
        EquivalenceClass::new(
            "communication",
            &["presentation", "public speaking", "written communication"],
        ),
        EquivalenceClass::new("leadership", &["team lead", "mentoring", "people management"]),
    ]
}

fn standard_categories() -> Vec<(DatabaseCategory, Vec<String>)> {
    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    vec![
        (
            DatabaseCategory::Relational,
            terms(&[
                "sql",
                "mysql",
                "postgresql",
                "postgres",
                "sql server",
                "ms sql",
                "mssql",
                "oracle",
                "sqlite",
                "mariadb",
                "t-sql",
                "pl/sql",
                "cockroachdb",
                "db2",
                "aurora",
            ]),
        ),
        (
            DatabaseCategory::NonRelational,
            terms(&[
                "nosql",
                "mongodb",
                "mongo",
                "cassandra",
                "couchdb",
                "dynamodb",
                "firebase",
                "firestore",
                "documentdb",
                "cosmosdb",
            ]),
        ),
        (
            DatabaseCategory::Vector,
            terms(&[
                "pinecone", "weaviate", "milvus", "qdrant", "chroma", "chromadb", "faiss",
                "pgvector",
            ]),
        ),
        (
            DatabaseCategory::KeyValue,
            terms(&["redis", "memcached", "etcd", "riak", "valkey"]),
        ),
        (
            DatabaseCategory::Graph,
            terms(&["neo4j", "arangodb", "janusgraph", "neptune", "tigergraph", "orientdb"]),
        ),
        (
            DatabaseCategory::TimeSeries,
            terms(&["influxdb", "timescaledb", "questdb", "opentsdb", "prometheus"]),
        ),
        (
            DatabaseCategory::Search,
            terms(&["elasticsearch", "opensearch", "solr", "algolia", "meilisearch", "typesense"]),
        ),
    ]
}
