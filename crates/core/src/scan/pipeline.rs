use crate::extract::extract_blocks;
use crate::model::{Diagnostic, DiagnosticKind, SourceLocation, SourceUnit};
use crate::parser::FieldParser;
use crate::report::FileOutcome;
use crate::validate::RecordValidator;
use crumbtrail_ingest::{Executor, ProgressObserver, WorkItem};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// What a worker is handed: a path to read, or text already in memory.
#[derive(Debug, Clone)]
pub enum ScanInput {
    Path(PathBuf),
    Source(SourceUnit),
}

/// read -> extract -> parse -> record-validate, for one file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilePipeline {
    parser: FieldParser,
    validator: RecordValidator,
}

impl FilePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, path: PathBuf) -> FileOutcome {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let (unit, lossy) = SourceUnit::from_bytes(path, &bytes);
                let mut outcome = self.process(&unit);
                if lossy {
                    outcome.diagnostics.insert(
                        0,
                        Diagnostic::warning(
                            DiagnosticKind::LossyDecoding,
                            "file is not valid UTF-8; invalid bytes were replaced",
                        )
                        .at(unit.whole_file()),
                    );
                }
                outcome
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                let location = SourceLocation::line(&path, 1);
                let mut outcome =
                    FileOutcome::empty(&path, crate::model::CommentSyntax::for_path(&path));
                outcome.diagnostics.push(
                    Diagnostic::error(DiagnosticKind::UnreadableFile, format!("unreadable file: {e}"))
                        .at(location),
                );
                outcome
            }
        }
    }

    pub fn process(&self, unit: &SourceUnit) -> FileOutcome {
        let mut outcome = FileOutcome {
            content_hash: unit.content_hash,
            ..FileOutcome::empty(&unit.path, unit.syntax)
        };

        for candidate in extract_blocks(unit) {
            match candidate {
                Ok(block) => {
                    outcome.blocks += 1;
                    if let Some(mut parsed) = self.parser.parse(&block, &unit.path) {
                        let findings = self.validator.validate(&parsed.record);
                        parsed.diagnostics.extend(findings);
                        outcome.records.push(parsed);
                    }
                }
                Err(diagnostic) => outcome.diagnostics.push(diagnostic),
            }
        }
        outcome
    }
}

impl Executor<ScanInput, FileOutcome> for FilePipeline {
    fn execute(&self, item: WorkItem<ScanInput>) -> FileOutcome {
        match item.payload {
            ScanInput::Path(path) => self.load(path),
            ScanInput::Source(unit) => self.process(&unit),
        }
    }
}

/// Logs per-file progress and a periodic summary line.
pub struct ScanObserver {
    total: usize,
    done: AtomicUsize,
    every: usize,
}

impl ScanObserver {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            every: (total / 10).max(100),
        }
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl ProgressObserver<FileOutcome> for ScanObserver {
    fn on_completed(&self, _seq: usize, key: &str, output: &FileOutcome) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "Scanned {} ({} blocks, {} records)",
            key,
            output.blocks,
            output.records.len()
        );
        if done % self.every == 0 {
            info!("Progress: {}/{} files", done, self.total);
        }
    }

    fn on_skipped(&self, _seq: usize, key: &str) {
        debug!("Skipped {} (scan cancelled)", key);
    }
}
