//! Resume analysis: document parsing, skill extraction, scoring and feedback.

pub mod analyzer;
pub mod embedding;
pub mod feedback;
pub mod handlers;
pub mod parser;
pub mod recommender;
pub mod scoring;
pub mod skills;
pub mod taxonomy;
