use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::embedding::EmbeddingBackend;
use crate::analysis::skills::ExtractionMode;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
// Bundled files resolve against the crate, not the working directory.
const DEFAULT_SKILLS_FILE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/assets/skills_taxonomy.json");
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub embedding_backend: EmbeddingBackend,
    pub extraction_mode: ExtractionMode,
    pub skills_file_path: String,
    pub min_words_resume: usize,
    pub min_words_jobdesc: usize,
    /// Initial value of the runtime feedback toggle.
    pub use_llm_feedback: bool,
    /// Merge potential skills from each job description into the taxonomy file.
    pub learn_skills: bool,
    pub max_upload_bytes: usize,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        // Hosted embeddings need a key; without one fall back to the local backend.
        let embedding_backend = match std::env::var("EMBEDDING_BACKEND") {
            Ok(raw) => raw
                .parse::<EmbeddingBackend>()
                .map_err(anyhow::Error::msg)
                .context("EMBEDDING_BACKEND must be 'openai' or 'local'")?,
            Err(_) if openai_api_key.is_some() => EmbeddingBackend::OpenAi,
            Err(_) => EmbeddingBackend::Local,
        };

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            openai_api_key,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            embedding_backend,
            extraction_mode: std::env::var("SKILL_EXTRACTION_MODE")
                .ok()
                .map(|raw| raw.parse::<ExtractionMode>().map_err(anyhow::Error::msg))
                .transpose()
                .context("SKILL_EXTRACTION_MODE must be 'taxonomy' or 'regex'")?
                .unwrap_or_default(),
            skills_file_path: std::env::var("SKILLS_FILE_PATH")
                .unwrap_or_else(|_| DEFAULT_SKILLS_FILE_PATH.to_string()),
            min_words_resume: parse_env("MIN_WORDS_RESUME", 100)?,
            min_words_jobdesc: parse_env("MIN_WORDS_JOBDESC", 50)?,
            use_llm_feedback: parse_env("USE_LLM_FEEDBACK", true)?,
            learn_skills: parse_env("LEARN_SKILLS", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            static_dir: std::env::var("STATIC_DIR")
                .unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: usize = parse_env("RESUME_ANALYZER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_malformed_value() {
        std::env::set_var("RESUME_ANALYZER_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = parse_env("RESUME_ANALYZER_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_default_taxonomy_is_bundled_and_populated() {
        let taxonomy =
            crate::analysis::taxonomy::SkillTaxonomy::load(DEFAULT_SKILLS_FILE_PATH).unwrap();
        let found = taxonomy
            .extract(
                "Need Kafka, Kubernetes and Terraform experts",
                ExtractionMode::Taxonomy,
            )
            .await;
        assert_eq!(found, vec!["kafka", "kubernetes", "terraform"]);
    }

    #[test]
    fn test_default_static_dir_serves_script() {
        assert!(std::path::Path::new(DEFAULT_STATIC_DIR)
            .join("script.js")
            .is_file());
    }

    #[test]
    fn test_parse_env_parses_bool() {
        std::env::set_var("RESUME_ANALYZER_TEST_FLAG", "false");
        let value: bool = parse_env("RESUME_ANALYZER_TEST_FLAG", true).unwrap();
        assert!(!value);
    }
}
