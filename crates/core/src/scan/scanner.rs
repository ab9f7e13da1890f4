use super::pipeline::{FilePipeline, ScanInput, ScanObserver};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::model::{CommentSyntax, Diagnostic, DiagnosticKind, SourceLocation, SourceUnit};
use crate::report::{FileOutcome, Report, ReportBuilder};
use crumbtrail_ingest::{CancellationToken, Dispatcher, RuntimeConfig, WorkItem};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Result of expanding the scan roots.
#[derive(Debug, Default)]
pub struct CollectedPaths {
    /// Files to scan, sorted.
    pub files: Vec<PathBuf>,
    /// Entries the walk could not read, as `unreadable file` outcomes.
    pub failures: Vec<FileOutcome>,
}

pub struct Scanner {
    config: ScanConfig,
    cancel: CancellationToken,
    pipeline: FilePipeline,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    pub fn with_cancellation(config: ScanConfig, cancel: CancellationToken) -> Self {
        Self {
            config,
            cancel,
            pipeline: FilePipeline::new(),
        }
    }

    /// Expands `roots` into the sorted list of files to scan.
    ///
    /// Directories are walked with `.gitignore` rules and filtered by
    /// extension. A root that is not a directory is always kept, so a
    /// missing path surfaces as an unreadable-file diagnostic. Entries the
    /// walk fails on (broken links, unreadable directories) are returned as
    /// failures rather than dropped.
    pub fn collect_paths<P: AsRef<Path>>(&self, roots: &[P]) -> CollectedPaths {
        let mut paths = Vec::new();
        let mut failures = Vec::new();
        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                paths.push(root.to_path_buf());
                continue;
            }
            let walker = WalkBuilder::new(root)
                .hidden(!self.config.include_hidden)
                .follow_links(self.config.follow_links)
                .build();
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Walk error under {}: {}", root.display(), e);
                        failures.push(walk_failure(root, &e));
                        continue;
                    }
                };
                let path = entry.path();
                if path.is_file() && self.config.matches_extension(path) {
                    paths.push(path.to_path_buf());
                }
            }
        }

        paths.sort();
        paths.dedup();
        if let Some(max) = self.config.max_files {
            if paths.len() > max {
                info!("Limiting scan to {} of {} files", max, paths.len());
                paths.truncate(max);
            }
        }
        failures.sort_by(|a: &FileOutcome, b: &FileOutcome| a.path.cmp(&b.path));
        CollectedPaths {
            files: paths,
            failures,
        }
    }

    pub fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Report> {
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_before_start());
        }
        let collected = self.collect_paths(roots);
        let inputs = collected
            .files
            .into_iter()
            .map(|path| (path.display().to_string(), ScanInput::Path(path)))
            .collect();
        self.dispatch(inputs, collected.failures)
    }

    /// Scans in-memory sources, in the order given.
    pub fn scan_sources(&self, sources: Vec<SourceUnit>) -> Result<Report> {
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_before_start());
        }
        let inputs = sources
            .into_iter()
            .map(|unit| (unit.path.display().to_string(), ScanInput::Source(unit)))
            .collect();
        self.dispatch(inputs, Vec::new())
    }

    fn cancelled_before_start(&self) -> Report {
        warn!("Scan cancelled before it started");
        let mut builder = ReportBuilder::new();
        builder.mark_cancelled();
        builder.build()
    }

    /// Runs `inputs` through the pipeline. Walk `failures` are merged into
    /// the file list by path.
    fn dispatch(
        &self,
        inputs: Vec<(String, ScanInput)>,
        failures: Vec<FileOutcome>,
    ) -> Result<Report> {
        let started = Instant::now();
        let runtime = RuntimeConfig::from(&self.config);
        let dispatcher = Dispatcher::with_cancellation(&runtime, self.cancel.clone())?;

        info!(
            "Scanning {} files with {} workers",
            inputs.len(),
            dispatcher.workers()
        );

        let items: Vec<_> = inputs
            .into_iter()
            .enumerate()
            .map(|(seq, (key, input))| WorkItem::new(seq, key, input))
            .collect();
        let observer = ScanObserver::new(items.len());
        let dispatched = dispatcher.run(items, &self.pipeline, &observer);

        let mut builder = ReportBuilder::new();
        if dispatched.cancelled {
            builder.mark_cancelled();
        }
        let mut outcomes = dispatched.into_completed();
        if !failures.is_empty() {
            outcomes.extend(failures);
            outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        }
        for outcome in outcomes {
            builder.push_file(outcome);
        }
        let report = builder.build();

        info!(
            "Scan finished in {:?}: {} records in {} files, {} diagnostics{}",
            started.elapsed(),
            report.records().len(),
            observer.done(),
            report.diagnostics().len(),
            if report.is_cancelled() { " (cancelled)" } else { "" }
        );
        Ok(report)
    }
}

fn walk_failure(root: &Path, err: &ignore::Error) -> FileOutcome {
    let path = failed_path(err).unwrap_or(root).to_path_buf();
    let mut outcome = FileOutcome::empty(&path, CommentSyntax::for_path(&path));
    outcome.diagnostics.push(
        Diagnostic::error(DiagnosticKind::UnreadableFile, format!("unreadable file: {err}"))
            .at(SourceLocation::line(&path, 1)),
    );
    outcome
}

/// Innermost path carried by a walk error.
fn failed_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            failed_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(failed_path),
        _ => None,
    }
}
