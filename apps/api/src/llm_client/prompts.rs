// Prompt constants for resume feedback.
// Placeholders are replaced by `analysis::feedback::build_feedback_prompt`.

/// System prompt for feedback generation.
pub const FEEDBACK_SYSTEM: &str = "You are a professional career advisor.";

/// Feedback prompt template.
/// Replace: {resume_text}, {job_text}, {missing_skills}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an AI resume reviewer. Given the resume and job description below,
provide specific, personalized improvement feedback.

Resume:
"""{resume_text}"""

Job Description:
"""{job_text}"""

Missing skills detected: {missing_skills}

Please:
1. Suggest 3–5 clear improvements to better match the job.
2. Reference relevant skills or job requirements.
3. Use a professional but friendly tone.
4. Be concise (under 200 words)."#;

/// Returned to the user whenever the hosted model cannot produce feedback.
pub const FEEDBACK_FALLBACK: &str = "AI feedback is temporarily unavailable \
    (e.g., quota exceeded or service offline). \
    Please check your OpenAI plan and try again later.";
