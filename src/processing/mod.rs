//! Document handling, the screening pipeline and result ranking

pub mod document;
pub mod text_processor;
pub mod candidate;
pub mod ranking;
pub mod pipeline;

pub use candidate::{CandidateResult, ResultStatus};
pub use pipeline::{CancelFlag, ProgressObserver, Screener, ScreeningContext, ScreeningOptions, ScreeningRun};
pub use ranking::{ResultSet, Shortlist, ShortlistFilter};
