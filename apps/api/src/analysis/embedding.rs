//! Text embeddings for semantic similarity.
//!
//! `AppState` holds an `Arc<dyn Embedder>`, chosen at startup from `EMBEDDING_BACKEND`:
//! - `OpenAiEmbedder`: hosted sentence embeddings through `llm_client`.
//! - `HashingEmbedder`: local, deterministic bag-of-ngrams vectors. No network.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Width of the local vectors (matches all-MiniLM-L6-v2).
pub const HASHING_DIMENSIONS: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    OpenAi,
    Local,
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(EmbeddingBackend::OpenAi),
            "local" => Ok(EmbeddingBackend::Local),
            other => Err(format!("unknown embedding backend '{other}'")),
        }
    }
}

/// The embedder trait. Implement this to swap backends without touching the analyzer.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds every text; output order matches input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AppError>;

    /// Short label for logs ("openai" | "local").
    fn backend(&self) -> &'static str;
}

/// Embeds both texts and returns their cosine similarity.
pub async fn semantic_similarity(
    embedder: &dyn Embedder,
    resume_text: &str,
    job_text: &str,
) -> Result<f64, AppError> {
    let vectors = embedder.embed_batch(&[resume_text, job_text]).await?;
    match vectors.as_slice() {
        [resume, job] => Ok(cosine_similarity(resume, job)),
        _ => Err(AppError::Embedding(format!(
            "{} backend returned {} vectors for 2 inputs",
            embedder.backend(),
            vectors.len()
        ))),
    }
}

/// Cosine similarity of two vectors. 0.0 when lengths differ or either norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiEmbedder
// ────────────────────────────────────────────────────────────────────────────

pub struct OpenAiEmbedder(pub LlmClient);

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AppError> {
        self.0
            .embed(texts)
            .await
            .map_err(|e| AppError::Embedding(format!("Hosted embedding call failed: {e}")))
    }

    fn backend(&self) -> &'static str {
        "openai"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Feature-hashing embedder over lowercased unigrams and bigrams.
///
/// Each n-gram lands in one of `HASHING_DIMENSIONS` buckets (FNV-1a) with weight
/// `1 + ln(tf)`; the vector is then L2-normalized. All components are non-negative,
/// so similarity stays in [0, 1].
pub struct HashingEmbedder;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9+#]+").unwrap());

impl HashingEmbedder {
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&lower).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in &tokens {
            *counts.entry(bucket(token.as_bytes())).or_default() += 1;
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            *counts.entry(bucket(bigram.as_bytes())).or_default() += 1;
        }

        let mut vector = vec![0.0_f32; HASHING_DIMENSIONS];
        for (index, tf) in counts {
            vector[index] = 1.0 + (tf as f32).ln();
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

fn bucket(bytes: &[u8]) -> usize {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = bytes.iter().fold(FNV_OFFSET, |h, b| {
        (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    });
    (hash % HASHING_DIMENSIONS as u64) as usize
}

/// Normalize embedding to unit length
fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in embedding.iter_mut() {
            *x /= norm;
        }
    }
}
