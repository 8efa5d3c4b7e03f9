//! Sequential screening pipeline: extract, prompt, score, aggregate

use crate::config::AiConfig;
use crate::error::ScoringError;
use crate::input::InputManager;
use crate::llm::prompts::{PromptTemplates, ScoringRequest};
use crate::llm::scoring::{Assessment, ScoringService};
use crate::processing::candidate::{CandidateResult, ResultStatus};
use crate::processing::document::{JobDescription, ResumeDocument};
use crate::processing::ranking::ResultSet;
use log::{debug, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared cancellation signal, set from the Ctrl-C handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Retry and timeout policy for scoring calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningOptions {
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for ScreeningOptions {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

impl From<&AiConfig> for ScreeningOptions {
    fn from(config: &AiConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff(),
        }
    }
}

impl ScreeningOptions {
    /// Delay before attempt `attempt` (1-based); doubles each time.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(16);
        self.retry_backoff.saturating_mul(1 << exponent)
    }
}

/// Per-run state: the job description and the cancellation flag.
#[derive(Debug, Clone)]
pub struct ScreeningContext {
    pub job: JobDescription,
    pub cancel: CancelFlag,
}

impl ScreeningContext {
    pub fn new(job: JobDescription) -> Self {
        Self {
            job,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(job: JobDescription, cancel: CancelFlag) -> Self {
        Self { job, cancel }
    }
}

/// Receives progress events while a run is in flight.
pub trait ProgressObserver {
    fn on_start(&self, _total: usize) {}
    fn on_document(&self, _index: usize, _name: &str) {}
    fn on_result(&self, _result: &CandidateResult) {}
    fn on_finish(&self, _counts: &RunCounts) {}
}

/// Observer that ignores every event.
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub scored: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunCounts {
    fn record(&mut self, status: ResultStatus) {
        match status {
            ResultStatus::Scored => self.scored += 1,
            ResultStatus::ExtractionFailed | ResultStatus::ScoringFailed => self.failed += 1,
            ResultStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.scored + self.failed + self.cancelled
    }
}

impl fmt::Display for RunCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scored, {} failed, {} cancelled",
            self.scored, self.failed, self.cancelled
        )
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRun {
    pub results: ResultSet,
    pub counts: RunCounts,
}

enum ScoreOutcome {
    Scored(Assessment),
    Failed(ScoringError),
    Cancelled,
}

/// Drives documents one at a time through extraction and scoring.
pub struct Screener<S> {
    scorer: S,
    input: InputManager,
    prompts: PromptTemplates,
    options: ScreeningOptions,
}

impl<S: ScoringService> Screener<S> {
    pub fn new(scorer: S, input: InputManager, options: ScreeningOptions) -> Self {
        Self {
            scorer,
            input,
            prompts: PromptTemplates::default(),
            options,
        }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Screen every document. Always yields one result per document, in
    /// upload order; per-document failures never abort the run.
    pub async fn screen(
        &self,
        context: &ScreeningContext,
        documents: &[ResumeDocument],
        observer: &dyn ProgressObserver,
    ) -> ScreeningRun {
        info!(
            "Screening {} resume(s) with {} (job description: {} words)",
            documents.len(),
            self.scorer.model_name(),
            context.job.word_count()
        );
        observer.on_start(documents.len());

        let mut results = ResultSet::new();
        let mut counts = RunCounts::default();

        for (index, document) in documents.iter().enumerate() {
            let result = if context.cancel.is_cancelled() {
                CandidateResult::cancelled(&document.name)
            } else {
                observer.on_document(index, &document.name);
                self.screen_document(context, document).await
            };

            counts.record(result.status);
            observer.on_result(&result);
            results.push(result);
        }

        info!("Screening finished: {}", counts);
        observer.on_finish(&counts);
        ScreeningRun { results, counts }
    }

    async fn screen_document(&self, context: &ScreeningContext, document: &ResumeDocument) -> CandidateResult {
        let extracted = match self.input.extract(document).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!("{}: {}", document.name, e);
                return CandidateResult::failed(&document.name, ResultStatus::ExtractionFailed, e);
            }
        };

        let request = self.prompts.build_request(&document.name, &context.job, &extracted);

        match self.score_with_retry(context, &request).await {
            ScoreOutcome::Scored(assessment) => {
                debug!("{}: score {}", document.name, assessment.score);
                CandidateResult::scored(&document.name, assessment)
            }
            ScoreOutcome::Failed(e) => {
                warn!("{}: {}", document.name, e);
                CandidateResult::failed(&document.name, ResultStatus::ScoringFailed, e)
            }
            ScoreOutcome::Cancelled => CandidateResult::cancelled(&document.name),
        }
    }

    /// Retries only transient failures, with exponential backoff.
    async fn score_with_retry(&self, context: &ScreeningContext, request: &ScoringRequest) -> ScoreOutcome {
        let mut attempt = 1;
        loop {
            let outcome = tokio::time::timeout(self.options.request_timeout, self.scorer.score(request)).await;
            let error = match outcome {
                Ok(Ok(assessment)) => return ScoreOutcome::Scored(assessment),
                Ok(Err(e)) => e,
                Err(_) => ScoringError::Timeout(self.options.request_timeout.as_secs()),
            };

            if !error.is_transient() || attempt >= self.options.max_attempts {
                return ScoreOutcome::Failed(error);
            }

            attempt += 1;
            let delay = self.options.backoff_for(attempt);
            warn!(
                "{}: attempt {} failed ({}), retrying in {}ms",
                request.resume_name,
                attempt - 1,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;

            if context.cancel.is_cancelled() {
                return ScoreOutcome::Cancelled;
            }
        }
    }
}
