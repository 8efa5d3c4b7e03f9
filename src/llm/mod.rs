//! AI scoring integration: prompt building, the scoring interface and the
//! Gemini client behind it

pub mod prompts;
pub mod scoring;
pub mod gemini;

pub use gemini::GeminiClient;
pub use scoring::{Assessment, ScoringService};
