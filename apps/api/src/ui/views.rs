//! Askama view models for the server-rendered UI.

use askama::Template;

use crate::analysis::analyzer::AnalysisResponse;
use crate::errors::AppError;
use crate::state::RuntimeSettings;

/// Display order and labels of the response metrics.
const METRIC_LABELS: &[(&str, &str)] = &[
    ("similarity", "Semantic similarity"),
    ("skill_coverage", "Skill coverage"),
    ("keyword_density", "Keyword density"),
    ("section_completeness", "Section completeness"),
];

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub settings: SettingsView,
    pub feedback_available: bool,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

impl IndexPage {
    pub fn new(settings: &RuntimeSettings, feedback_available: bool) -> Self {
        Self {
            settings: SettingsView::from(settings),
            feedback_available,
            result: None,
            error: None,
        }
    }

    pub fn with_result(mut self, report: &AnalysisResponse) -> Self {
        self.result = Some(ResultView::from(report));
        self
    }

    pub fn with_error(mut self, message: String) -> Self {
        self.error = Some(message);
        self
    }

    pub fn to_html(&self) -> Result<String, AppError> {
        self.render()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Template rendering failed: {e}")))
    }
}

pub struct SettingsView {
    pub similarity: String,
    pub skill_coverage: String,
    pub keyword_density: String,
    pub section_completeness: String,
    pub use_llm_feedback: bool,
}

impl From<&RuntimeSettings> for SettingsView {
    fn from(settings: &RuntimeSettings) -> Self {
        let w = &settings.weights;
        Self {
            similarity: format!("{:.2}", w.semantic_similarity),
            skill_coverage: format!("{:.2}", w.skill_coverage),
            keyword_density: format!("{:.2}", w.keyword_density),
            section_completeness: format!("{:.2}", w.section_completeness),
            use_llm_feedback: settings.use_llm_feedback,
        }
    }
}

pub struct MetricView {
    pub label: String,
    /// Raw ratio; the bar animation reads it from `data-value`.
    pub value: String,
}

pub struct ResultView {
    pub score: String,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: Vec<MetricView>,
    pub ai_feedback: Option<String>,
}

impl From<&AnalysisResponse> for ResultView {
    fn from(report: &AnalysisResponse) -> Self {
        let metrics = METRIC_LABELS
            .iter()
            .filter_map(|(key, label)| {
                report.metrics.get(*key).map(|value| MetricView {
                    label: label.to_string(),
                    value: format!("{value:.3}"),
                })
            })
            .collect();

        Self {
            score: format!("{:.2}", report.score),
            missing_keywords: report.missing_keywords.clone(),
            // Recommendations carry markdown emphasis for API clients; plain text here.
            recommendations: report
                .recommendations
                .iter()
                .map(|r| r.replace("**", ""))
                .collect(),
            metrics,
            ai_feedback: report.ai_feedback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scoring::ScoringWeights;
    use std::collections::BTreeMap;

    fn settings() -> RuntimeSettings {
        RuntimeSettings {
            weights: ScoringWeights::default(),
            use_llm_feedback: false,
        }
    }

    #[test]
    fn test_empty_page_renders_form_and_settings() {
        let html = IndexPage::new(&settings(), true).to_html().unwrap();
        assert!(html.contains("name=\"resume_file\""));
        assert!(html.contains("name=\"job_description\""));
        assert!(html.contains("LLM Feedback: OFF"));
        assert!(html.contains("value=\"0.40\""));
    }

    #[test]
    fn test_result_page_escapes_and_lists_keywords() {
        let report = AnalysisResponse {
            score: 72.5,
            missing_keywords: vec!["<kafka>".to_string()],
            recommendations: vec!["Consider adding experience with **kafka**".to_string()],
            metrics: BTreeMap::from([
                ("similarity".to_string(), 0.8),
                ("skill_coverage".to_string(), 0.5),
            ]),
            ai_feedback: Some("Tailor your summary.".to_string()),
        };
        let html = IndexPage::new(&settings(), true)
            .with_result(&report)
            .to_html()
            .unwrap();
        assert!(html.contains("72.50"));
        assert!(!html.contains("<kafka>"));
        assert!(html.contains("&#60;kafka&#62;"));
        assert!(html.contains("Consider adding experience with kafka"));
        assert!(html.contains("data-value=\"0.800\""));
        assert!(html.contains("Tailor your summary."));
    }

    #[test]
    fn test_error_page_shows_message() {
        let html = IndexPage::new(&settings(), false)
            .with_error("Job description too short for analysis.".to_string())
            .to_html()
            .unwrap();
        assert!(html.contains("Job description too short for analysis."));
    }
}
