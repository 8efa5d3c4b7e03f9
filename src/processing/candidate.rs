//! Per-resume screening results

use crate::llm::scoring::Assessment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a resume's result came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Scored,
    ExtractionFailed,
    ScoringFailed,
    Cancelled,
}

impl ResultStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, ResultStatus::ExtractionFailed | ResultStatus::ScoringFailed)
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResultStatus::Scored => "scored",
            ResultStatus::ExtractionFailed => "extraction failed",
            ResultStatus::ScoringFailed => "scoring failed",
            ResultStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// One row of the result set. Every uploaded resume produces exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub score: u8,
    pub explanation: String,
    pub matched_keywords: Vec<String>,
    pub status: ResultStatus,
}

impl CandidateResult {
    pub fn scored(file_name: impl Into<String>, assessment: Assessment) -> Self {
        Self {
            file_name: file_name.into(),
            name: assessment.name,
            email: assessment.email,
            phone: assessment.phone,
            location: assessment.location,
            score: assessment.score,
            explanation: assessment.explanation,
            matched_keywords: assessment.matched_keywords,
            status: ResultStatus::Scored,
        }
    }

    /// A zero-score placeholder whose explanation carries the failure.
    pub fn failed(file_name: impl Into<String>, status: ResultStatus, reason: impl fmt::Display) -> Self {
        let file_name = file_name.into();
        let explanation = format!("Error processing {}: {}", file_name, reason);
        Self::empty(file_name, status, explanation)
    }

    pub fn cancelled(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let explanation = format!("Not processed: {} was cancelled before scoring", file_name);
        Self::empty(file_name, ResultStatus::Cancelled, explanation)
    }

    fn empty(file_name: String, status: ResultStatus, explanation: String) -> Self {
        Self {
            file_name,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            score: 0,
            explanation,
            matched_keywords: Vec::new(),
            status,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.status == ResultStatus::Scored
    }

    /// Name to show for the row; falls back to the file name.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.file_name
        } else {
            &self.name
        }
    }

    pub fn keywords_joined(&self) -> String {
        self.matched_keywords.join(", ")
    }
}
