//! Analyzer: validates the two texts and runs the scoring pipeline.
//!
//! Pipeline: validate → similarity → skill extraction → coverage → density
//! → completeness → weighted score → recommendations → optional feedback.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::embedding::{semantic_similarity, Embedder};
use crate::analysis::feedback::FeedbackGenerator;
use crate::analysis::recommender::generate_recommendations;
use crate::analysis::scoring::{
    compute_final_score, compute_skill_coverage, keyword_density, section_completeness,
    MatchMetrics, ScoringWeights,
};
use crate::analysis::skills::{extract_potential_skills, ExtractionMode};
use crate::analysis::taxonomy::SkillTaxonomy;
use crate::errors::AppError;

/// Minimum word counts below which a text is rejected as unreadable.
#[derive(Debug, Clone, Copy)]
pub struct TextLimits {
    pub min_words_resume: usize,
    pub min_words_jobdesc: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            min_words_resume: 100,
            min_words_jobdesc: 50,
        }
    }
}

/// Per-request knobs read from the runtime settings.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub weights: ScoringWeights,
    pub include_feedback: bool,
}

/// JSON schema of an analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub score: f64,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: BTreeMap<String, f64>,
    pub ai_feedback: Option<String>,
}

#[derive(Clone)]
pub struct Analyzer {
    embedder: Arc<dyn Embedder>,
    taxonomy: Arc<SkillTaxonomy>,
    feedback: FeedbackGenerator,
    mode: ExtractionMode,
    limits: TextLimits,
    learn_skills: bool,
}

impl Analyzer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        taxonomy: Arc<SkillTaxonomy>,
        feedback: FeedbackGenerator,
        mode: ExtractionMode,
        limits: TextLimits,
    ) -> Self {
        Self {
            embedder,
            taxonomy,
            feedback,
            mode,
            limits,
            learn_skills: false,
        }
    }

    /// Merge potential skills from every analyzed job description into the taxonomy.
    pub fn with_skill_learning(mut self, enabled: bool) -> Self {
        self.learn_skills = enabled;
        self
    }

    pub fn taxonomy(&self) -> &Arc<SkillTaxonomy> {
        &self.taxonomy
    }

    pub fn feedback_available(&self) -> bool {
        self.feedback.is_available()
    }

    pub fn embedding_backend(&self) -> &'static str {
        self.embedder.backend()
    }

    pub async fn analyze(
        &self,
        resume_text: &str,
        job_text: &str,
        options: AnalysisOptions,
    ) -> Result<AnalysisResponse, AppError> {
        validate_texts(resume_text, job_text, &self.limits)?;

        let similarity = semantic_similarity(self.embedder.as_ref(), resume_text, job_text).await?;
        debug!(
            "Similarity {:.3} via {} embedder",
            similarity,
            self.embedder.backend()
        );

        let resume_skills = self.taxonomy.extract(resume_text, self.mode).await;
        let job_skills = self.taxonomy.extract(job_text, self.mode).await;
        let coverage = compute_skill_coverage(&job_skills, &resume_skills);

        let metrics = MatchMetrics {
            similarity,
            skill_coverage: coverage.ratio,
            keyword_density: keyword_density(resume_text),
            section_completeness: section_completeness(resume_text),
        };
        let score = compute_final_score(&metrics, &options.weights);

        info!(
            score,
            job_skills = job_skills.len(),
            found = coverage.found.len(),
            missing = coverage.missing.len(),
            "Analysis scored"
        );

        let recommendations = generate_recommendations(&coverage.missing);

        let ai_feedback = if options.include_feedback {
            self.feedback
                .generate(resume_text, job_text, &coverage.missing)
                .await
        } else {
            None
        };

        if self.learn_skills {
            self.learn_from_job(job_text).await;
        }

        Ok(AnalysisResponse {
            score,
            missing_keywords: coverage.missing,
            recommendations,
            metrics: metrics.to_rounded_map(),
            ai_feedback,
        })
    }

    async fn learn_from_job(&self, job_text: &str) {
        let candidates = extract_potential_skills(job_text);
        if let Err(e) = self.taxonomy.add_skills(&candidates).await {
            warn!("Failed to update skill taxonomy: {e:?}");
        }
    }
}

fn validate_texts(resume_text: &str, job_text: &str, limits: &TextLimits) -> Result<(), AppError> {
    if word_count(resume_text) < limits.min_words_resume {
        return Err(AppError::Validation(
            "Resume text seems too short or unreadable.".to_string(),
        ));
    }
    if word_count(job_text) < limits.min_words_jobdesc {
        return Err(AppError::Validation(
            "Job description too short for analysis.".to_string(),
        ));
    }
    Ok(())
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
