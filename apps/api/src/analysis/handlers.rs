//! Axum route handlers for the JSON analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::analysis::analyzer::AnalysisResponse;
use crate::analysis::parser::parse_resume_file;
use crate::errors::AppError;
use crate::state::AppState;

/// The two fields of an analysis upload.
#[derive(Debug)]
pub struct AnalysisForm {
    pub filename: String,
    pub resume_file: Bytes,
    pub job_description: String,
}

/// Reads `resume_file` and `job_description` from a multipart body. Unknown fields are ignored.
pub async fn read_analysis_form(mut multipart: Multipart) -> Result<AnalysisForm, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume_file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume_file: {e}")))?;
                resume = Some((filename, data));
            }
            Some("job_description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job_description: {e}")))?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let (filename, resume_file) =
        resume.ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;

    Ok(AnalysisForm {
        filename,
        resume_file,
        job_description,
    })
}

/// Parses the upload and runs one analysis with the current runtime settings.
pub async fn run_analysis(state: &AppState, form: AnalysisForm) -> Result<AnalysisResponse, AppError> {
    let analysis_id = Uuid::new_v4();
    let span = tracing::info_span!("analysis", %analysis_id, file = %form.filename);

    async move {
        let resume_text = parse_resume_file(&form.filename, form.resume_file).await?;
        let options = state.settings_snapshot().await.analysis_options();
        let report = state
            .analyzer
            .analyze(&resume_text, &form.job_description, options)
            .await?;
        info!("Analysis complete: score={}", report.score);
        Ok::<_, AppError>(report)
    }
    .instrument(span)
    .await
}

/// POST /api/v1/resume/analyze
///
/// Multipart upload of a resume (PDF/DOCX) plus a job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let form = read_analysis_form(multipart).await?;
    let report = run_analysis(&state, form).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub required: Vec<String>,
}

/// GET /api/v1/skills
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<SkillListResponse> {
    Json(SkillListResponse {
        required: state.analyzer.taxonomy().skills().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct AddSkillsRequest {
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AddSkillsResponse {
    pub added: Vec<String>,
    pub total: usize,
}

/// POST /api/v1/skills
///
/// Merges new skills into the taxonomy file; existing entries are ignored.
pub async fn handle_add_skills(
    State(state): State<AppState>,
    Json(request): Json<AddSkillsRequest>,
) -> Result<Json<AddSkillsResponse>, AppError> {
    let taxonomy = state.analyzer.taxonomy();
    let added = taxonomy.add_skills(&request.skills).await?;
    let total = taxonomy.skills().await.len();
    Ok(Json(AddSkillsResponse { added, total }))
}
