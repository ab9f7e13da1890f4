//! Reporter: the frozen result of a scan.
//!
//! [`ReportBuilder`] collects per-file outcomes in scan order, numbers the
//! records, runs the corpus rules and derives the indices. The resulting
//! [`Report`] has no mutators.

pub mod query;
pub mod stats;

use crate::model::{
    BreadcrumbRecord, CommentSyntax, Diagnostic, RecordId, Severity, Status,
};
use crate::parser::ParsedBlock;
use crate::validate::{clamp_priority, validate_corpus};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use query::{BreadcrumbQuery, QueryResult};
pub use stats::Statistics;

/// Everything the per-file pipeline produced for one path.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub content_hash: u64,
    pub syntax: CommentSyntax,
    /// Candidate comment blocks seen by the parser.
    pub blocks: usize,
    /// Records with their parse and record-level diagnostics.
    pub records: Vec<ParsedBlock>,
    /// Findings not tied to a record (unreadable file, unterminated comment).
    pub diagnostics: Vec<Diagnostic>,
}

impl FileOutcome {
    pub fn empty(path: impl Into<PathBuf>, syntax: CommentSyntax) -> Self {
        Self {
            path: path.into(),
            content_hash: 0,
            syntax,
            blocks: 0,
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileSummary {
    pub path: PathBuf,
    pub content_hash: u64,
    pub syntax: CommentSyntax,
    pub blocks: usize,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordEntry {
    pub id: RecordId,
    /// False when the record has an error diagnostic or its phase is part
    /// of a dependency cycle.
    pub valid: bool,
    pub record: BreadcrumbRecord,
}

#[derive(Debug, Default)]
pub struct ReportBuilder {
    files: Vec<FileOutcome>,
    cancelled: bool,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files must be pushed in scan order.
    pub fn push_file(&mut self, file: FileOutcome) {
        self.files.push(file);
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn build(self) -> Report {
        let mut files = Vec::with_capacity(self.files.len());
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        for file in self.files {
            files.push(FileSummary {
                path: file.path,
                content_hash: file.content_hash,
                syntax: file.syntax,
                blocks: file.blocks,
                records: file.records.len(),
            });
            diagnostics.extend(file.diagnostics);
            for parsed in file.records {
                let id = RecordId(records.len());
                diagnostics.extend(parsed.diagnostics.into_iter().map(|d| d.for_record(id)));
                records.push(parsed.record);
            }
        }

        let corpus = validate_corpus(&records);
        diagnostics.extend(corpus.diagnostics);

        let mut invalid = vec![false; records.len()];
        for diagnostic in diagnostics.iter().filter(|d| d.is_error()) {
            if let Some(slot) = diagnostic.record.and_then(|id| invalid.get_mut(id.0)) {
                *slot = true;
            }
        }

        let records: Vec<RecordEntry> = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                let in_cycle = record
                    .phase()
                    .map(|p| corpus.cyclic_phases.contains(p))
                    .unwrap_or(false);
                RecordEntry {
                    id: RecordId(idx),
                    valid: !invalid[idx] && !in_cycle,
                    record,
                }
            })
            .collect();

        let mut phases: IndexMap<String, Vec<RecordId>> = IndexMap::new();
        let mut unindexed = Vec::new();
        let mut by_status: BTreeMap<Status, Vec<RecordId>> = BTreeMap::new();
        let mut by_assignee: BTreeMap<String, Vec<RecordId>> = BTreeMap::new();
        let mut by_priority = Vec::new();

        for entry in &records {
            let r = &entry.record;
            match r.phase() {
                Some(phase) => phases.entry(phase.to_string()).or_default().push(entry.id),
                None => unindexed.push(entry.id),
            }
            if let Some(status) = r.status {
                by_status.entry(status).or_default().push(entry.id);
            }
            if let Some(assignee) = &r.assigned_to {
                by_assignee.entry(assignee.clone()).or_default().push(entry.id);
            }
            if let Some(priority) = r.priority {
                by_priority.push((clamp_priority(priority), entry.id));
            }
        }
        // stable: equal priorities keep source order
        by_priority.sort_by_key(|(priority, _)| Reverse(*priority));

        tracing::debug!(
            "Report assembled: {} files, {} records, {} diagnostics",
            files.len(),
            records.len(),
            diagnostics.len()
        );

        Report {
            files,
            records,
            phases,
            unindexed,
            diagnostics,
            by_status,
            by_assignee,
            by_priority: by_priority.into_iter().map(|(_, id)| id).collect(),
            cancelled: self.cancelled,
        }
    }
}

/// Immutable aggregate of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    files: Vec<FileSummary>,
    records: Vec<RecordEntry>,
    /// Phase to record ids, most recent last.
    phases: IndexMap<String, Vec<RecordId>>,
    unindexed: Vec<RecordId>,
    diagnostics: Vec<Diagnostic>,
    by_status: BTreeMap<Status, Vec<RecordId>>,
    by_assignee: BTreeMap<String, Vec<RecordId>>,
    by_priority: Vec<RecordId>,
    cancelled: bool,
}

impl Report {
    pub fn files(&self) -> &[FileSummary] {
        &self.files
    }

    pub fn records(&self) -> &[RecordEntry] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&RecordEntry> {
        self.records.get(id.0)
    }

    fn resolve<'a>(&'a self, ids: &'a [RecordId]) -> impl Iterator<Item = &'a RecordEntry> + 'a {
        ids.iter().filter_map(|id| self.record(*id))
    }

    pub fn phase_names(&self) -> impl Iterator<Item = &str> {
        self.phases.keys().map(String::as_str)
    }

    pub fn phase(&self, phase: &str) -> Vec<&RecordEntry> {
        self.phases
            .get(phase)
            .map(|ids| self.resolve(ids).collect())
            .unwrap_or_default()
    }

    /// The last record of `phase` in file-then-line order.
    pub fn latest(&self, phase: &str) -> Option<&RecordEntry> {
        self.phases
            .get(phase)
            .and_then(|ids| ids.last())
            .and_then(|id| self.record(*id))
    }

    pub fn with_status(&self, status: Status) -> Vec<&RecordEntry> {
        self.by_status
            .get(&status)
            .map(|ids| self.resolve(ids).collect())
            .unwrap_or_default()
    }

    pub fn assigned_to(&self, assignee: &str) -> Vec<&RecordEntry> {
        self.by_assignee
            .get(assignee)
            .map(|ids| self.resolve(ids).collect())
            .unwrap_or_default()
    }

    /// Records with a priority, highest clamped value first.
    pub fn by_priority(&self) -> Vec<&RecordEntry> {
        self.resolve(&self.by_priority).collect()
    }

    pub fn unindexed(&self) -> Vec<&RecordEntry> {
        self.resolve(&self.unindexed).collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_with(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    pub fn diagnostics_for(&self, id: RecordId) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.record == Some(id))
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics {
            total_records: self.records.len(),
            valid_records: self.records.iter().filter(|r| r.valid).count(),
            files_scanned: self.files.len(),
            files_with_breadcrumbs: self.files.iter().filter(|f| f.records > 0).count(),
            unindexed: self.unindexed.len(),
            ..Statistics::default()
        };
        for (phase, ids) in &self.phases {
            stats.phases.insert(phase.clone(), ids.len());
        }
        for (status, ids) in &self.by_status {
            stats.statuses.insert(status.as_str().to_string(), ids.len());
        }
        for diagnostic in &self.diagnostics {
            match diagnostic.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.infos += 1,
            }
        }
        stats
    }

    pub fn execute(&self, query: &BreadcrumbQuery) -> QueryResult {
        match query {
            BreadcrumbQuery::Phase { phase, latest } => {
                if *latest {
                    QueryResult::records(self.latest(phase))
                } else {
                    QueryResult::records(self.phase(phase))
                }
            }
            BreadcrumbQuery::Status { status } => QueryResult::records(self.with_status(*status)),
            BreadcrumbQuery::Assignee { assignee } => {
                QueryResult::records(self.assigned_to(assignee))
            }
            BreadcrumbQuery::Priority { limit, min } => {
                let min = min.map(clamp_priority);
                let records = self
                    .by_priority()
                    .into_iter()
                    .filter(|entry| match (min, entry.record.priority) {
                        (Some(min), Some(p)) => clamp_priority(p) >= min,
                        _ => true,
                    })
                    .take(*limit);
                QueryResult::records(records)
            }
            BreadcrumbQuery::Diagnostics { severity, record } => QueryResult::diagnostics(
                self.diagnostics.iter().filter(|d| {
                    severity.map(|s| d.severity == s).unwrap_or(true)
                        && record.map(|id| d.record == Some(id)).unwrap_or(true)
                }),
            ),
            BreadcrumbQuery::Unindexed => QueryResult::records(self.unindexed()),
        }
    }
}
