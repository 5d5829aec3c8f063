mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::{Analyzer, TextLimits};
use crate::analysis::embedding::{Embedder, EmbeddingBackend, HashingEmbedder, OpenAiEmbedder};
use crate::analysis::feedback::FeedbackGenerator;
use crate::analysis::scoring::ScoringWeights;
use crate::analysis::skills::ExtractionMode;
use crate::analysis::taxonomy::SkillTaxonomy;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::{AppState, RuntimeSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional: feedback and hosted embeddings need it)
    let llm = match &config.openai_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), &config.openai_base_url)?;
            info!("LLM client initialized (model: {})", llm_client::CHAT_MODEL);
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY not set, AI feedback disabled");
            None
        }
    };

    let embedder: Arc<dyn Embedder> = match (config.embedding_backend, &llm) {
        (EmbeddingBackend::OpenAi, Some(client)) => {
            info!("Embedding backend: openai ({})", llm_client::EMBEDDING_MODEL);
            Arc::new(OpenAiEmbedder(client.clone()))
        }
        (EmbeddingBackend::OpenAi, None) => {
            warn!("EMBEDDING_BACKEND=openai requires OPENAI_API_KEY, using local embeddings");
            Arc::new(HashingEmbedder)
        }
        (EmbeddingBackend::Local, _) => {
            info!("Embedding backend: local hashing");
            Arc::new(HashingEmbedder)
        }
    };

    let taxonomy = Arc::new(SkillTaxonomy::load(&config.skills_file_path)?);
    if config.extraction_mode == ExtractionMode::Taxonomy && taxonomy.skills().await.is_empty() {
        warn!(
            "Skill taxonomy at {} is empty, every job will report zero skills",
            config.skills_file_path
        );
    }

    let analyzer = Analyzer::new(
        embedder,
        taxonomy,
        FeedbackGenerator::new(llm),
        config.extraction_mode,
        TextLimits {
            min_words_resume: config.min_words_resume,
            min_words_jobdesc: config.min_words_jobdesc,
        },
    )
    .with_skill_learning(config.learn_skills);

    // Build app state
    let state = AppState::new(
        analyzer,
        RuntimeSettings {
            weights: ScoringWeights::default(),
            use_llm_feedback: config.use_llm_feedback,
        },
    );

    // Build router
    let app = build_router(state, &config.static_dir, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
