//! Schema Validator.
//!
//! Per-record rules run inside the per-file pipeline; corpus rules need every
//! record and run once after the join. Neither ever drops a record.

pub mod graph;

use crate::model::{BreadcrumbRecord, Diagnostic, DiagnosticKind, RecordId};
use std::collections::{BTreeSet, HashSet};
use std::ops::RangeInclusive;

pub use graph::PhaseGraph;

pub const PRIORITY_RANGE: RangeInclusive<i64> = 0..=10;

pub fn clamp_priority(priority: i64) -> i64 {
    priority.clamp(*PRIORITY_RANGE.start(), *PRIORITY_RANGE.end())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, record: &BreadcrumbRecord) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        let at = || record.location.clone();

        if record.phase.is_none() {
            out.push(Diagnostic::error(DiagnosticKind::MissingPhase, "missing AI_PHASE").at(at()));
        }
        if record.status.is_none() {
            out.push(
                Diagnostic::warning(DiagnosticKind::MissingStatus, "missing AI_STATUS").at(at()),
            );
        }

        if let Some(priority) = record.priority {
            if !PRIORITY_RANGE.contains(&priority) {
                out.push(
                    Diagnostic::warning(
                        DiagnosticKind::PriorityOutOfRange,
                        format!(
                            "priority {priority} outside {}..={}; indexed as {}",
                            PRIORITY_RANGE.start(),
                            PRIORITY_RANGE.end(),
                            clamp_priority(priority)
                        ),
                    )
                    .at(at()),
                );
            }
        }

        if let (Some(count), Some(max)) = (record.retry_count, record.max_retries) {
            if count > max {
                out.push(
                    Diagnostic::error(
                        DiagnosticKind::RetryLimitExceeded,
                        format!("retry count {count} exceeds max retries {max}"),
                    )
                    .at(at()),
                );
            }
        }

        if let (Some(claimed), Some(timeout)) = (record.claimed_at, record.timeout) {
            if timeout <= claimed {
                out.push(
                    Diagnostic::error(
                        DiagnosticKind::TimeoutBeforeClaim,
                        format!(
                            "timeout {} is not after claim {}",
                            timeout.to_rfc3339(),
                            claimed.to_rfc3339()
                        ),
                    )
                    .at(at()),
                );
            }
        }

        if record.assigned_to.is_some() && record.claimed_at.is_none() {
            out.push(
                Diagnostic::warning(
                    DiagnosticKind::AssignedWithoutClaim,
                    "assigned without claim timestamp",
                )
                .at(at()),
            );
        }

        if (record.compiler_err.is_some() || record.runtime_err.is_some())
            && record.fix_reason.is_none()
        {
            out.push(
                Diagnostic::warning(
                    DiagnosticKind::ErrorWithoutFix,
                    "error recorded without FIX_REASON",
                )
                .at(at()),
            );
        }

        out
    }
}

pub fn validate_record(record: &BreadcrumbRecord) -> Vec<Diagnostic> {
    RecordValidator::new().validate(record)
}

/// Findings that need the whole corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusFindings {
    pub diagnostics: Vec<Diagnostic>,
    /// Phases that take part in a dependency cycle.
    pub cyclic_phases: BTreeSet<String>,
}

/// `records` must be in report order; positions become [`RecordId`]s.
pub fn validate_corpus(records: &[BreadcrumbRecord]) -> CorpusFindings {
    let known: HashSet<&str> = records.iter().filter_map(|r| r.phase()).collect();
    let mut findings = CorpusFindings::default();

    for (idx, record) in records.iter().enumerate() {
        let mut reported = HashSet::new();
        for target in record.referenced_phases() {
            if known.contains(target) || !reported.insert(target) {
                continue;
            }
            findings.diagnostics.push(
                Diagnostic::info(
                    DiagnosticKind::DanglingReference,
                    format!("dangling phase reference: {target}"),
                )
                .at(record.location.clone())
                .for_record(RecordId(idx))
                .with_related(vec![target.to_string()]),
            );
        }
    }

    let graph = PhaseGraph::from_records(records);
    for cycle in graph.cycles() {
        let anchor = cycle
            .iter()
            .find_map(|phase| records.iter().position(|r| r.phase() == Some(phase.as_str())));

        let mut diagnostic = Diagnostic::error(
            DiagnosticKind::CircularDependency,
            format!("circular dependency among phases: {}", cycle.join(", ")),
        );
        if let Some(idx) = anchor {
            diagnostic = diagnostic
                .at(records[idx].location.clone())
                .for_record(RecordId(idx));
        }
        findings.cyclic_phases.extend(cycle.iter().cloned());
        findings.diagnostics.push(diagnostic.with_related(cycle));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, SourceLocation, Status};
    use chrono::{TimeZone, Utc};

    fn record(phase: Option<&str>) -> BreadcrumbRecord {
        let mut r = BreadcrumbRecord::new(SourceLocation::new("a.c", 1, 2));
        r.phase = phase.map(str::to_string);
        r.status = Some(Status::Implemented);
        r
    }

    fn kinds(diags: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diags.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn clean_record_has_no_findings() {
        assert!(validate_record(&record(Some("A"))).is_empty());
    }

    #[test]
    fn missing_phase_is_an_error() {
        let diags = validate_record(&record(None));
        assert_eq!(diags[0].message, "missing AI_PHASE");
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn retry_count_over_max_is_an_error() {
        let mut r = record(Some("A"));
        r.retry_count = Some(4);
        r.max_retries = Some(3);
        let diags = validate_record(&r);
        assert_eq!(kinds(&diags), vec![DiagnosticKind::RetryLimitExceeded]);
        assert!(diags[0].is_error());

        r.retry_count = Some(3);
        assert!(validate_record(&r).is_empty());
    }

    #[test]
    fn priority_range_and_clamping() {
        let mut r = record(Some("A"));
        r.priority = Some(15);
        let diags = validate_record(&r);
        assert_eq!(kinds(&diags), vec![DiagnosticKind::PriorityOutOfRange]);
        assert_eq!(clamp_priority(15), 10);
        assert_eq!(clamp_priority(-2), 0);
        assert_eq!(clamp_priority(7), 7);
    }

    #[test]
    fn claim_rules() {
        let mut r = record(Some("A"));
        r.assigned_to = Some("agent_7".into());
        let diags = validate_record(&r);
        assert_eq!(diags[0].message, "assigned without claim timestamp");

        r.claimed_at = Some(Utc.with_ymd_and_hms(2025, 10, 15, 14, 30, 0).unwrap());
        r.timeout = Some(Utc.with_ymd_and_hms(2025, 10, 15, 14, 0, 0).unwrap());
        assert_eq!(kinds(&validate_record(&r)), vec![DiagnosticKind::TimeoutBeforeClaim]);
    }

    #[test]
    fn compiler_error_needs_fix_reason() {
        let mut r = record(Some("A"));
        r.compiler_err = Some("undefined symbol".into());
        assert_eq!(kinds(&validate_record(&r)), vec![DiagnosticKind::ErrorWithoutFix]);
        r.fix_reason = Some("added include".into());
        assert!(validate_record(&r).is_empty());
    }

    #[test]
    fn dangling_references_are_info() {
        let mut a = record(Some("A"));
        a.dependencies.insert("GHOST".into());
        a.blocks.insert("GHOST".into());
        let findings = validate_corpus(&[a]);
        assert_eq!(findings.diagnostics.len(), 1);
        assert_eq!(findings.diagnostics[0].severity, Severity::Info);
        assert_eq!(findings.diagnostics[0].message, "dangling phase reference: GHOST");
        assert_eq!(findings.diagnostics[0].record, Some(RecordId(0)));
    }

    #[test]
    fn mutual_dependency_is_one_cycle_in_any_order() {
        let mut a = record(Some("A"));
        a.dependencies.insert("B".into());
        let mut b = record(Some("B"));
        b.dependencies.insert("A".into());

        for corpus in [vec![a.clone(), b.clone()], vec![b, a]] {
            let findings = validate_corpus(&corpus);
            assert_eq!(findings.diagnostics.len(), 1);
            let diag = &findings.diagnostics[0];
            assert_eq!(diag.kind, DiagnosticKind::CircularDependency);
            assert_eq!(diag.related, vec!["A", "B"]);
            assert_eq!(diag.message, "circular dependency among phases: A, B");
            assert_eq!(findings.cyclic_phases.len(), 2);
        }
    }

    #[test]
    fn blocks_close_a_cycle() {
        // A depends on B, and A blocks B (B waits for A)
        let mut a = record(Some("A"));
        a.dependencies.insert("B".into());
        a.blocks.insert("B".into());
        let b = record(Some("B"));
        let findings = validate_corpus(&[a, b]);
        assert_eq!(kinds(&findings.diagnostics), vec![DiagnosticKind::CircularDependency]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut a = record(Some("A"));
        a.dependencies.insert("A".into());
        let findings = validate_corpus(&[a]);
        assert_eq!(findings.diagnostics[0].related, vec!["A"]);
    }
}
