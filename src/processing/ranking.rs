//! Result aggregation, filtering and ranking

use crate::config::FilterConfig;
use crate::processing::candidate::CandidateResult;
use serde::Serialize;

/// Shortlist criteria. `None` or a blank location means no filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortlistFilter {
    pub location: Option<String>,
    pub min_score: Option<u8>,
}

impl ShortlistFilter {
    pub fn new(location: Option<String>, min_score: Option<u8>) -> Self {
        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        Self { location, min_score }
    }

    pub fn matches(&self, result: &CandidateResult) -> bool {
        let location_ok = match &self.location {
            Some(wanted) => result.location.to_lowercase().contains(&wanted.to_lowercase()),
            None => true,
        };
        let score_ok = self.min_score.map_or(true, |min| result.score >= min);
        location_ok && score_ok
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.min_score.is_none()
    }
}

impl From<&FilterConfig> for ShortlistFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.location.clone(), config.min_score)
    }
}

/// All results of one run, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    results: Vec<CandidateResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: CandidateResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateResult> {
        self.results.iter()
    }

    /// Filtered subset sorted by score, highest first. Ties keep upload order.
    pub fn view(&self, filter: &ShortlistFilter) -> Shortlist<'_> {
        let mut entries: Vec<&CandidateResult> = self.results.iter().filter(|r| filter.matches(r)).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Shortlist {
            entries,
            filter: filter.clone(),
            total: self.results.len(),
        }
    }
}

impl From<Vec<CandidateResult>> for ResultSet {
    fn from(results: Vec<CandidateResult>) -> Self {
        Self { results }
    }
}

/// A ranked view over a `ResultSet`, shared by display and export.
#[derive(Debug, Clone)]
pub struct Shortlist<'a> {
    entries: Vec<&'a CandidateResult>,
    filter: ShortlistFilter,
    total: usize,
}

impl<'a> Shortlist<'a> {
    pub fn entries(&self) -> &[&'a CandidateResult] {
        &self.entries
    }

    pub fn filter(&self) -> &ShortlistFilter {
        &self.filter
    }

    /// Size of the underlying result set before filtering.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
