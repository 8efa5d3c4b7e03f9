//! Display and export of screening results

pub mod table;
pub mod report;
pub mod formatter;
pub mod export;

pub use export::{export, ExportFormat};
pub use formatter::{OutputFormatter, ReportGenerator};
pub use report::{ReportMetadata, ScreeningReport};
pub use table::ShortlistTable;
