//! Axum route handlers for the server-rendered UI and its settings endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::handlers::{read_analysis_form, run_analysis};
use crate::analysis::scoring::ScoringWeights;
use crate::errors::AppError;
use crate::state::{AppState, RuntimeSettings};
use crate::ui::views::IndexPage;

/// GET /ui
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let settings = state.settings_snapshot().await;
    let page = IndexPage::new(&settings, state.analyzer.feedback_available());
    Ok(Html(page.to_html()?))
}

/// POST /ui/analyze
///
/// Same pipeline as the JSON API; failures are rendered into the page
/// with the matching status code.
pub async fn handle_ui_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Html<String>), AppError> {
    let outcome = match read_analysis_form(multipart).await {
        Ok(form) => run_analysis(&state, form).await,
        Err(e) => Err(e),
    };

    let settings = state.settings_snapshot().await;
    let page = IndexPage::new(&settings, state.analyzer.feedback_available());

    let (status, page) = match outcome {
        Ok(report) => (StatusCode::OK, page.with_result(&report)),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!("UI analysis failed: {e:?}");
            }
            (e.status(), page.with_error(e.public_message()))
        }
    };

    Ok((status, Html(page.to_html()?)))
}

/// GET /settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<RuntimeSettings> {
    Json(state.settings_snapshot().await)
}

/// POST /toggle_llm
pub async fn handle_toggle_llm(State(state): State<AppState>) -> Json<Value> {
    let mut settings = state.settings.write().await;
    settings.use_llm_feedback = !settings.use_llm_feedback;
    info!("LLM feedback toggled: {}", settings.use_llm_feedback);
    Json(json!({ "USE_LLM_FEEDBACK": settings.use_llm_feedback }))
}

/// Weight names as posted by the UI sliders.
#[derive(Debug, Deserialize)]
pub struct WeightUpdate {
    pub similarity: f64,
    pub skill_coverage: f64,
    pub keyword_density: f64,
    pub section_completeness: f64,
}

#[derive(Debug, Serialize)]
pub struct WeightUpdateResponse {
    pub weights: ScoringWeights,
}

/// POST /update_weights
pub async fn handle_update_weights(
    State(state): State<AppState>,
    Json(update): Json<WeightUpdate>,
) -> Result<Json<WeightUpdateResponse>, AppError> {
    let weights = ScoringWeights {
        semantic_similarity: update.similarity,
        skill_coverage: update.skill_coverage,
        keyword_density: update.keyword_density,
        section_completeness: update.section_completeness,
    }
    .normalized()
    .map_err(AppError::Validation)?;

    state.settings.write().await.weights = weights;
    info!("Scoring weights updated: {:?}", weights);

    Ok(Json(WeightUpdateResponse { weights }))
}
