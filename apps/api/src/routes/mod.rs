pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::analysis::handlers;
use crate::state::AppState;
use crate::ui::handlers as ui;

/// GET /
async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the AI Resume Analyzer API" }))
}

pub fn build_router(state: AppState, static_dir: &str, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health::health_handler))
        // JSON API
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/skills",
            get(handlers::handle_list_skills).post(handlers::handle_add_skills),
        )
        // Server-rendered UI
        .route("/ui", get(ui::handle_index))
        .route("/ui/analyze", post(ui::handle_ui_analyze))
        .route("/toggle_llm", post(ui::handle_toggle_llm))
        .route("/update_weights", post(ui::handle_update_weights))
        .route("/settings", get(ui::handle_get_settings))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
