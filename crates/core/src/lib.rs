//! Extraction, parsing, validation and reporting of breadcrumb annotations.
//!
//! ```no_run
//! use crumbtrail_core::{scan_paths, ScanConfig};
//!
//! let report = scan_paths(&["src"], ScanConfig::default())?;
//! for entry in report.phase("MEMORY_MANAGER") {
//!     println!("{} {:?}", entry.record.location, entry.record.status);
//! }
//! # Ok::<(), crumbtrail_core::CrumbError>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod parser;
pub mod report;
pub mod scan;
pub mod validate;

pub use config::ScanConfig;
pub use crumbtrail_ingest::CancellationToken;
pub use error::{CrumbError, Result};
pub use model::{
    BreadcrumbRecord, Complexity, Diagnostic, DiagnosticKind, RecordId, Severity, SourceLocation,
    SourceUnit, Status,
};
pub use report::{
    BreadcrumbQuery, FileOutcome, FileSummary, QueryResult, RecordEntry, Report, ReportBuilder,
    Statistics,
};
pub use scan::Scanner;

use std::path::Path;

pub fn scan_paths<P: AsRef<Path>>(roots: &[P], config: ScanConfig) -> Result<Report> {
    Scanner::new(config).scan(roots)
}

/// Runs the per-file stages on one in-memory source, without corpus rules.
pub fn parse_source(unit: &SourceUnit) -> FileOutcome {
    scan::FilePipeline::new().process(unit)
}
