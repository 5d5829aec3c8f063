use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Verbs that signal concrete, results-oriented writing.
pub const ACTION_VERBS: &[&str] = &[
    "developed",
    "designed",
    "implemented",
    "created",
    "analyzed",
    "managed",
    "led",
    "built",
    "optimized",
    "deployed",
    "trained",
    "collaborated",
    "improved",
];

/// Headings a complete resume is expected to mention.
pub const RESUME_SECTIONS: &[&str] = &["experience", "education", "skills", "projects"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic_similarity: f64,
    pub skill_coverage: f64,
    pub keyword_density: f64,
    pub section_completeness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic_similarity: 0.4,
            skill_coverage: 0.3,
            keyword_density: 0.2,
            section_completeness: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Rejects negative, non-finite and all-zero weights, then scales them to sum to 1.
    pub fn normalized(self) -> Result<Self, String> {
        let values = [
            self.semantic_similarity,
            self.skill_coverage,
            self.keyword_density,
            self.section_completeness,
        ];
        if values.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("Weights must be finite, non-negative numbers".to_string());
        }
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            return Err("At least one weight must be greater than zero".to_string());
        }
        Ok(Self {
            semantic_similarity: self.semantic_similarity / total,
            skill_coverage: self.skill_coverage / total,
            keyword_density: self.keyword_density / total,
            section_completeness: self.section_completeness / total,
        })
    }
}

/// The four ratios that feed the final score, each in [0, 1] (similarity may dip below 0
/// with hosted embeddings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchMetrics {
    pub similarity: f64,
    pub skill_coverage: f64,
    pub keyword_density: f64,
    pub section_completeness: f64,
}

impl MatchMetrics {
    /// Metric name → value rounded to 3 decimals, as exposed in responses.
    pub fn to_rounded_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("similarity".to_string(), round_to(self.similarity, 3)),
            ("skill_coverage".to_string(), round_to(self.skill_coverage, 3)),
            ("keyword_density".to_string(), round_to(self.keyword_density, 3)),
            (
                "section_completeness".to_string(),
                round_to(self.section_completeness, 3),
            ),
        ])
    }
}

/// Split of job skills into those the resume covers and those it lacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillCoverage {
    pub found: Vec<String>,
    pub missing: Vec<String>,
    /// found / job skills; 0.0 when the job yields no skills.
    pub ratio: f64,
}

/// Partitions `job_skills` by membership in `resume_skills`, preserving job order.
pub fn compute_skill_coverage(job_skills: &[String], resume_skills: &[String]) -> SkillCoverage {
    let (found, missing): (Vec<String>, Vec<String>) = job_skills
        .iter()
        .cloned()
        .partition(|skill| resume_skills.contains(skill));

    let ratio = if job_skills.is_empty() {
        0.0
    } else {
        found.len() as f64 / job_skills.len() as f64
    };

    SkillCoverage {
        found,
        missing,
        ratio,
    }
}

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Share of word tokens that are action verbs. 0.0 for text without tokens.
pub fn keyword_density(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let (total, matches) = WORD_RE
        .find_iter(&lower)
        .fold((0_usize, 0_usize), |(total, matches), token| {
            let hit = ACTION_VERBS.contains(&token.as_str());
            (total + 1, matches + usize::from(hit))
        });

    if total == 0 {
        0.0
    } else {
        matches as f64 / total as f64
    }
}

/// Share of `RESUME_SECTIONS` mentioned anywhere in the text.
pub fn section_completeness(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let present = RESUME_SECTIONS
        .iter()
        .filter(|section| lower.contains(*section))
        .count();
    present as f64 / RESUME_SECTIONS.len() as f64
}

/// Final score: 100 × weighted sum of the metrics, rounded to 2 decimals.
pub fn compute_final_score(metrics: &MatchMetrics, weights: &ScoringWeights) -> f64 {
    let weighted = weights.semantic_similarity * metrics.similarity
        + weights.skill_coverage * metrics.skill_coverage
        + weights.keyword_density * metrics.keyword_density
        + weights.section_completeness * metrics.section_completeness;
    round_to(weighted * 100.0, 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
