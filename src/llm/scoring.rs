//! Scoring service interface and strict validation of its answers

use crate::error::ScoringError;
use crate::llm::prompts::ScoringRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;

/// Anything that can turn one scoring request into an assessment.
pub trait ScoringService {
    fn score(
        &self,
        request: &ScoringRequest,
    ) -> impl Future<Output = std::result::Result<Assessment, ScoringError>> + Send;

    fn model_name(&self) -> &str;
}

/// The AI-provided fields of a candidate result, after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub score: u8,
    pub explanation: String,
    pub matched_keywords: Vec<String>,
}

/// Exact wire shape; unknown or missing keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAssessment {
    name: String,
    email: String,
    phone: String,
    location: String,
    score: f64,
    explanation: String,
    matched_keywords: Vec<String>,
}

const NOT_FOUND_MARKERS: &[&str] = &["not found", "n/a", "none", "null", "unknown", "not provided"];

impl Assessment {
    /// Parse and validate the service's JSON answer.
    pub fn from_json(text: &str) -> std::result::Result<Self, ScoringError> {
        let body = strip_code_fence(text.trim());
        let raw: RawAssessment = serde_json::from_str(body)
            .map_err(|e| ScoringError::Malformed(format!("response does not match the schema: {}", e)))?;

        if !raw.score.is_finite() || !(0.0..=100.0).contains(&raw.score) {
            return Err(ScoringError::Malformed(format!(
                "score must be between 0 and 100, got {}",
                raw.score
            )));
        }

        let explanation = raw.explanation.trim().to_string();
        if explanation.is_empty() {
            return Err(ScoringError::Malformed("explanation is empty".to_string()));
        }

        Ok(Self {
            name: contact_field(&raw.name),
            email: contact_field(&raw.email),
            phone: contact_field(&raw.phone),
            location: contact_field(&raw.location),
            score: raw.score.round() as u8,
            explanation,
            matched_keywords: keyword_set(raw.matched_keywords),
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}

fn contact_field(value: &str) -> String {
    let trimmed = value.trim();
    if NOT_FOUND_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Trim, drop blanks and case-insensitive duplicates; first spelling wins.
fn keyword_set(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}
