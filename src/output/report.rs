//! Screening report: the shortlist table plus run metadata

use crate::output::table::ShortlistTable;
use crate::processing::pipeline::RunCounts;
use crate::processing::ranking::Shortlist;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a formatter needs to render one run.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub metadata: ReportMetadata,
    pub summary: RunSummary,
    pub filter: FilterSummary,
    pub table: ShortlistTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub screener_version: String,
    pub model: String,
    /// Where the job description came from: a file path or "inline text".
    pub job_source: String,
    pub job_word_count: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub shortlisted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub location: Option<String>,
    pub min_score: Option<u8>,
}

impl FilterSummary {
    pub fn describe(&self) -> String {
        match (&self.location, self.min_score) {
            (None, None) => "none".to_string(),
            (Some(location), None) => format!("location contains \"{}\"", location),
            (None, Some(min)) => format!("score >= {}", min),
            (Some(location), Some(min)) => format!("location contains \"{}\", score >= {}", location, min),
        }
    }
}

impl ScreeningReport {
    pub fn new(shortlist: &Shortlist<'_>, counts: &RunCounts, metadata: ReportMetadata) -> Self {
        let table = ShortlistTable::from_shortlist(shortlist);
        Self {
            metadata,
            summary: RunSummary {
                total: counts.total(),
                scored: counts.scored,
                failed: counts.failed,
                cancelled: counts.cancelled,
                shortlisted: table.len(),
            },
            filter: FilterSummary {
                location: shortlist.filter().location.clone(),
                min_score: shortlist.filter().min_score,
            },
            table,
        }
    }

    pub fn generated_at_display(&self) -> String {
        self.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

impl ReportMetadata {
    pub fn new(model: impl Into<String>, job_source: impl Into<String>, job_word_count: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            screener_version: env!("CARGO_PKG_VERSION").to_string(),
            model: model.into(),
            job_source: job_source.into(),
            job_word_count,
            processing_time_ms: 0,
        }
    }

    pub fn with_processing_time(mut self, millis: u64) -> Self {
        self.processing_time_ms = millis;
        self
    }
}
