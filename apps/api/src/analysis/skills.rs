//! Skill extraction.
//!
//! Two modes produce the skill sets compared during analysis:
//! - `Taxonomy`: entity-style pass that keeps only terms listed in the skill taxonomy.
//! - `Regex`: every technical-looking token, no taxonomy needed.
//!
//! `extract_potential_skills` is a separate, looser heuristic used to grow the taxonomy.

use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    #[default]
    Taxonomy,
    Regex,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "taxonomy" | "ner" => Ok(ExtractionMode::Taxonomy),
            "regex" => Ok(ExtractionMode::Regex),
            other => Err(format!("unknown skill extraction mode '{other}'")),
        }
    }
}

/// Case-insensitive multi-pattern matcher over the taxonomy entries.
pub struct SkillMatcher {
    skills: Vec<String>,
    automaton: AhoCorasick,
}

impl SkillMatcher {
    /// Builds the matcher. Entries are trimmed and lowercased; blanks and duplicates dropped.
    pub fn new<I, S>(skills: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let skills: Vec<String> = skills
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&skills)
            .context("Failed to build skill matcher")?;

        Ok(Self { skills, automaton })
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn contains(&self, skill: &str) -> bool {
        let skill = skill.trim().to_lowercase();
        self.skills.iter().any(|s| *s == skill)
    }

    /// All taxonomy entries occurring in `text` on token boundaries.
    pub fn find(&self, text: &str) -> BTreeSet<String> {
        let bytes = text.as_bytes();
        self.automaton
            .find_overlapping_iter(text)
            .filter(|m| {
                let before = m.start().checked_sub(1).map(|i| bytes[i]);
                let after = bytes.get(m.end()).copied();
                is_boundary(before) && is_boundary(after)
            })
            .map(|m| self.skills[m.pattern().as_usize()].clone())
            .collect()
    }
}

/// A boundary is the text edge or any byte that cannot continue a skill token.
fn is_boundary(byte: Option<u8>) -> bool {
    match byte {
        None => true,
        Some(b) => !(b.is_ascii_alphanumeric() || b == b'+' || b == b'#'),
    }
}

/// Extracts the skill set of `text` in the given mode. Always sorted and deduplicated.
pub fn extract_skills(text: &str, mode: ExtractionMode, matcher: &SkillMatcher) -> Vec<String> {
    match mode {
        ExtractionMode::Taxonomy => matcher.find(text).into_iter().collect(),
        ExtractionMode::Regex => extract_regex_terms(text),
    }
}

static TERM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z0-9+#.]{3,}\b").unwrap());

/// Tokens of three or more `[a-zA-Z0-9+#.]` characters, lowercased, shorter than 20.
pub fn extract_regex_terms(text: &str) -> Vec<String> {
    TERM_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() < 20)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

static CAPITALIZED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z0-9+#]*\b").unwrap());

const NOISE_WORDS: &[&str] = &["The", "And", "Or", "In", "Of", "To", "For", "With"];

/// Capitalized or technical-looking words that might be skills, lowercased and sorted.
pub fn extract_potential_skills(text: &str) -> Vec<String> {
    CAPITALIZED_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|c| !NOISE_WORDS.contains(c) && c.len() > 2)
        .map(str::to_lowercase)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> SkillMatcher {
        SkillMatcher::new([
            "Rust",
            "c",
            "c++",
            "c#",
            "machine learning",
            "node.js",
            "go",
            "sql",
            "rust",
        ])
        .unwrap()
    }

    #[test]
    fn test_matcher_dedups_and_lowercases() {
        let m = matcher();
        assert_eq!(m.skills().len(), 8);
        assert!(m.contains("RUST"));
    }

    #[test]
    fn test_find_is_case_insensitive_and_multiword() {
        let found = matcher().find("Applied Machine Learning in RUST services");
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["machine learning", "rust"]
        );
    }

    #[test]
    fn test_find_respects_token_boundaries() {
        let found = matcher().find("Trusted C++ and C# developer; Google Go fan");
        assert!(found.contains("c++"));
        assert!(found.contains("c#"));
        assert!(found.contains("go"));
        // "Trusted" must not yield "rust"; "C++" must not yield "c"; "Google" must not yield "go"
        assert!(!found.contains("rust"));
        assert!(!found.contains("c"));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_find_allows_trailing_punctuation() {
        let found = matcher().find("Skills: SQL, Node.js.");
        assert!(found.contains("sql"));
        assert!(found.contains("node.js"));
    }

    #[test]
    fn test_extract_skills_taxonomy_mode_is_sorted() {
        let skills = extract_skills("sql and rust and go", ExtractionMode::Taxonomy, &matcher());
        assert_eq!(skills, vec!["go", "rust", "sql"]);
    }

    #[test]
    fn test_regex_terms_lowercase_dedup_and_length_filter() {
        let terms = extract_regex_terms(
            "Built APIs in Rust. rust, Go, C++ and an extraordinarilylongtokenname",
        );
        assert!(terms.contains(&"rust".to_string()));
        assert!(terms.contains(&"apis".to_string()));
        assert!(terms.contains(&"built".to_string()));
        // shorter than three characters
        assert!(!terms.contains(&"go".to_string()));
        // 20+ characters
        assert!(!terms.iter().any(|t| t.starts_with("extraordinarily")));
        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
    }

    #[test]
    fn test_potential_skills_filters_noise() {
        let skills = extract_potential_skills("The team uses Kubernetes And Terraform with AWS on Go");
        assert_eq!(skills, vec!["aws", "kubernetes", "terraform"]);
    }

    #[test]
    fn test_extraction_mode_from_str() {
        assert_eq!("regex".parse::<ExtractionMode>().unwrap(), ExtractionMode::Regex);
        assert_eq!("NER".parse::<ExtractionMode>().unwrap(), ExtractionMode::Taxonomy);
        assert!("spacy".parse::<ExtractionMode>().is_err());
    }
}
