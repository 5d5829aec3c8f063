use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::analysis::analyzer::{AnalysisOptions, Analyzer};
use crate::analysis::scoring::ScoringWeights;

/// Settings adjustable at runtime from the UI. Shared by every request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuntimeSettings {
    pub weights: ScoringWeights,
    #[serde(rename = "USE_LLM_FEEDBACK")]
    pub use_llm_feedback: bool,
}

impl RuntimeSettings {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            weights: self.weights,
            include_feedback: self.use_llm_feedback,
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    /// Writers (toggle, weight updates) are serialized; analyses take a snapshot.
    pub settings: Arc<RwLock<RuntimeSettings>>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, settings: RuntimeSettings) -> Self {
        Self {
            analyzer,
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub async fn settings_snapshot(&self) -> RuntimeSettings {
        *self.settings.read().await
    }
}
