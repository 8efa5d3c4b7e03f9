//! Resume screener library
//!
//! Ranks resumes against a job description: files are turned into text (or
//! forwarded as images), scored by a generative-AI service, then filtered,
//! sorted and exported.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod llm;
pub mod output;

pub use config::Config;
pub use error::{Result, ScoringError, ScreenerError};
