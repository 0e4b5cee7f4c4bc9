//! Text helpers shared by the matcher, the inference rules and the scorers.

use regex::Regex;
use tracing::warn;

/// Lower-cases and trims a skill or keyword into its comparable form.
pub fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// A compiled set of terms matched as whole tokens.
///
/// A hit must not be glued to a letter or digit on either side, so `"go"` does
/// not match inside `"google"` while `"c#"` and `"node.js"` still match inside
/// `"c#, node.js"`. Terms are normalized on construction; texts are expected to
/// be lower-cased already. Static vocabularies are compiled once behind `Lazy`.
#[derive(Debug, Clone)]
pub struct TermSet {
    pattern: Option<Regex>,
}

impl TermSet {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = terms
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(&t))
            .collect();
        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let source = format!(
            r"(?:^|[^\p{{L}}\p{{N}}])(?:{})(?:$|[^\p{{L}}\p{{N}}])",
            alternatives.join("|")
        );
        match Regex::new(&source) {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                warn!("Term set of {} terms failed to compile: {e}", alternatives.len());
                Self { pattern: None }
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().map_or(false, |re| re.is_match(text))
    }
}

/// Joins non-empty fragments with a single space and lower-cases the result.
pub fn join_lowercase<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fragments
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_term(text: &str, term: &str) -> bool {
        TermSet::new([term]).is_match(text)
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Node.JS "), "node.js");
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("built services in go and rust", "go"));
        assert!(!contains_term("worked at google", "go"));
        assert!(!contains_term("leverage storage", "rag"));
    }

    #[test]
    fn test_contains_term_handles_symbols() {
        assert!(contains_term("c#, node.js, ci/cd", "c#"));
        assert!(contains_term("c#, node.js, ci/cd", "node.js"));
        assert!(contains_term("c#, node.js, ci/cd", "ci/cd"));
    }

    #[test]
    fn test_contains_term_finds_later_occurrence() {
        assert!(contains_term("golang then go", "go"));
    }

    #[test]
    fn test_contains_term_empty_term_never_matches() {
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_contains_term_multibyte_text() {
        assert!(contains_term("café — rust", "rust"));
        assert!(!contains_term("éé", "x"));
    }

    #[test]
    fn test_term_set_matches_any_member() {
        let set = TermSet::new(["Docker", "k8s", "  "]);
        assert!(set.is_match("deployed on k8s clusters"));
        assert!(set.is_match("docker"));
        assert!(!set.is_match("dockerized"));
        assert!(!TermSet::new(Vec::<String>::new()).is_match("anything"));
    }

    #[test]
    fn test_term_set_escapes_regex_syntax() {
        let set = TermSet::new(["c++", "es6+", "(beta)"]);
        assert!(set.is_match("wrote c++ daily"));
        assert!(set.is_match("modern es6+ code"));
        assert!(!set.is_match("cxx and es6"));
    }

    #[test]
    fn test_join_lowercase_skips_empty() {
        assert_eq!(join_lowercase(["Senior", "", "  Engineer "]), "senior engineer");
    }
}
