//! Optional prose feedback from the hosted chat model.
//!
//! Feedback never fails an analysis: without an API key it is skipped, and any
//! call failure is replaced by a fixed fallback message.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::llm_client::prompts::{FEEDBACK_FALLBACK, FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::llm_client::{ChatOptions, LlmClient, LlmError};

/// Characters of each document forwarded to the model.
const MAX_PROMPT_CHARS: usize = 2000;

const FEEDBACK_OPTIONS: ChatOptions = ChatOptions {
    temperature: 0.7,
    max_tokens: 350,
};

#[derive(Clone)]
pub struct FeedbackGenerator {
    llm: Option<LlmClient>,
}

impl FeedbackGenerator {
    /// `None` disables feedback entirely (no API key configured).
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Returns `None` when no client is configured, otherwise the model's reply
    /// or the fallback message.
    pub async fn generate(
        &self,
        resume_text: &str,
        job_text: &str,
        missing_skills: &[String],
    ) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let prompt = build_feedback_prompt(resume_text, job_text, missing_skills);

        match request_feedback(llm, &prompt).await {
            Ok(text) => {
                debug!("LLM feedback generated ({} chars)", text.len());
                Some(text)
            }
            Err(e) => {
                warn!("LLM feedback generation failed: {e}");
                Some(FEEDBACK_FALLBACK.to_string())
            }
        }
    }
}

async fn request_feedback(llm: &LlmClient, prompt: &str) -> Result<String, LlmError> {
    let response = llm.chat(FEEDBACK_SYSTEM, prompt, FEEDBACK_OPTIONS).await?;
    response
        .text()
        .map(str::to_string)
        .ok_or(LlmError::EmptyContent)
}

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(resume_text|job_text|missing_skills)\}").unwrap());

/// Fills the template in one pass, so placeholder text inside the documents stays literal.
pub fn build_feedback_prompt(resume_text: &str, job_text: &str, missing_skills: &[String]) -> String {
    let resume = truncate_chars(resume_text, MAX_PROMPT_CHARS);
    let job = truncate_chars(job_text, MAX_PROMPT_CHARS);
    let missing = missing_skills.join(", ");

    PLACEHOLDER_RE
        .replace_all(FEEDBACK_PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "resume_text" => resume.to_string(),
            "job_text" => job.to_string(),
            _ => missing.clone(),
        })
        .into_owned()
}

/// The first `max_chars` characters of `s`, never splitting a UTF-8 sequence.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
