//! Field Parser: turns one comment block into a [`BreadcrumbRecord`].
//!
//! Parsing never fails. Values that cannot be coerced become diagnostics
//! and the field stays absent, so one bad line never hides the rest of the
//! block.

pub mod context;
pub mod values;

use crate::extract::CommentBlock;
use crate::model::vocabulary::split_key_line;
use crate::model::{
    BreadcrumbRecord, Complexity, Diagnostic, DiagnosticKind, FieldKey, KnownField,
    SourceLocation, Status,
};
use context::{ContextOutcome, ContextParser};
use std::collections::HashSet;
use std::path::Path;

/// A parsed record and the diagnostics raised while parsing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub record: BreadcrumbRecord,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldParser;

impl FieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when the block carries no recognized field, e.g. a
    /// comment that only happens to contain `TODO: later`.
    pub fn parse(&self, block: &CommentBlock, path: &Path) -> Option<ParsedBlock> {
        let mut state = BlockState::new(path, block);
        let mut context = ContextParser::new();

        for line in &block.lines {
            let field = split_key_line(&line.text);

            if context.is_open() {
                let recognized = field
                    .map(|(key, _)| FieldKey::classify(key).is_recognized())
                    .unwrap_or(false);
                if !recognized {
                    let opened_at = context.opened_at().unwrap_or(line.number);
                    let outcome = context.feed(&line.text);
                    state.apply_context(outcome, opened_at, line.number);
                    continue;
                }
                let opened_at = context.opened_at().unwrap_or(line.number);
                let outcome = context.abort();
                state.apply_context(outcome, opened_at, line.number.saturating_sub(1));
            }

            let Some((key, value)) = field else {
                continue;
            };
            match FieldKey::classify(key) {
                FieldKey::Known(KnownField::Context) => {
                    if state.accept_scalar(KnownField::Context, value, line.number) {
                        let opened_at = context.opened_at().unwrap_or(line.number);
                        let outcome = context.open(value, line.number);
                        state.apply_context(outcome, opened_at, line.number);
                    }
                }
                FieldKey::Known(known) => state.apply_known(known, value, line.number),
                FieldKey::Reference(kind) => state.apply_reference(kind, value, line.number),
                FieldKey::Extension(name) => state.apply_extension(name, value),
            }
        }

        if let Some(opened_at) = context.opened_at() {
            let outcome = context.abort();
            state.apply_context(outcome, opened_at, block.end_line);
        }

        state.finish()
    }
}

struct BlockState<'p> {
    path: &'p Path,
    record: BreadcrumbRecord,
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<KnownField>,
    recognized: bool,
}

impl<'p> BlockState<'p> {
    fn new(path: &'p Path, block: &CommentBlock) -> Self {
        let mut record = BreadcrumbRecord::new(block.location(path));
        record.declaration = block.declaration.clone();
        Self {
            path,
            record,
            diagnostics: Vec::new(),
            seen: HashSet::new(),
            recognized: false,
        }
    }

    fn line(&self, number: usize) -> SourceLocation {
        SourceLocation::line(self.path, number)
    }

    fn warn(&mut self, kind: DiagnosticKind, message: String, line: usize) {
        let location = self.line(line);
        self.diagnostics
            .push(Diagnostic::warning(kind, message).at(location));
    }

    /// Common checks for a known key: empty values are dropped, repeated
    /// scalars are flagged (the later one still wins).
    fn accept_scalar(&mut self, field: KnownField, value: &str, line: usize) -> bool {
        self.recognized = true;
        if value.is_empty() {
            self.warn(
                DiagnosticKind::EmptyValue,
                format!("empty value for {}", field.key()),
                line,
            );
            return false;
        }
        if !self.seen.insert(field) && !field.accumulates() {
            self.warn(
                DiagnosticKind::DuplicateField,
                format!("duplicate {}; the later value wins", field.key()),
                line,
            );
        }
        true
    }

    fn apply_known(&mut self, field: KnownField, value: &str, line: usize) {
        if !self.accept_scalar(field, value, line) {
            return;
        }
        let text = Some(value.to_string());
        let record = &mut self.record;
        match field {
            KnownField::Phase => record.phase = text,
            KnownField::Status => {
                let status = Status::parse(value).unwrap_or_else(|| {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::UnrecognizedStatus,
                            format!("unrecognized status value: {value}"),
                        )
                        .at(SourceLocation::line(self.path, line)),
                    );
                    Status::Unknown
                });
                self.record.status = Some(status);
            }
            KnownField::Complexity => match Complexity::parse(value) {
                Some(c) => record.complexity = Some(c),
                None => self.warn(
                    DiagnosticKind::UnrecognizedComplexity,
                    format!("unrecognized complexity value: {value}"),
                    line,
                ),
            },
            KnownField::Priority => match values::integer::<i64>(value) {
                Some(p) => record.priority = Some(p),
                None => self.invalid_number(field, value, line),
            },
            KnownField::RetryCount => match values::integer::<u32>(value) {
                Some(n) => record.retry_count = Some(n),
                None => self.invalid_number(field, value, line),
            },
            KnownField::MaxRetries => match values::integer::<u32>(value) {
                Some(n) => record.max_retries = Some(n),
                None => self.invalid_number(field, value, line),
            },
            KnownField::ClaimedAt => match values::timestamp(value) {
                Some(ts) => record.claimed_at = Some(ts),
                None => self.invalid_timestamp(field, value, line),
            },
            KnownField::Timeout => match values::timestamp(value) {
                Some(ts) => record.timeout = Some(ts),
                None => self.invalid_timestamp(field, value, line),
            },
            KnownField::Dependencies => {
                record
                    .dependencies
                    .extend(values::phase_list(value).map(str::to_string));
            }
            KnownField::Blocks => {
                record
                    .blocks
                    .extend(values::phase_list(value).map(str::to_string));
            }
            KnownField::Pattern => record.pattern = text,
            KnownField::Strategy => record.strategy = text,
            KnownField::AssignedTo => record.assigned_to = text,
            KnownField::Details => record.details = text,
            KnownField::Note => record.note = text,
            KnownField::History => record.history = text,
            KnownField::Change => record.change = text,
            KnownField::Version => record.version = text,
            KnownField::TrainHash => record.train_hash = text,
            KnownField::CompilerErr => record.compiler_err = text,
            KnownField::RuntimeErr => record.runtime_err = text,
            KnownField::FixReason => record.fix_reason = text,
            KnownField::HumanOverride => record.human_override = text,
            KnownField::Implementation => record.implementation = text,
            KnownField::EstimatedTime => record.estimated_time = text,
            KnownField::Bounty => record.bounty = text,
            // routed through the context sub-parser
            KnownField::Context => {}
        }
    }

    fn invalid_number(&mut self, field: KnownField, value: &str, line: usize) {
        self.warn(
            DiagnosticKind::InvalidNumber,
            format!("{} is not a valid number: {value}", field.key()),
            line,
        );
    }

    fn invalid_timestamp(&mut self, field: KnownField, value: &str, line: usize) {
        self.warn(
            DiagnosticKind::InvalidTimestamp,
            format!("{} is not an RFC 3339 timestamp: {value}", field.key()),
            line,
        );
    }

    fn apply_reference(&mut self, kind: &str, value: &str, line: usize) {
        self.recognized = true;
        if value.is_empty() {
            self.warn(DiagnosticKind::EmptyValue, format!("empty value for {kind}"), line);
            return;
        }
        self.record
            .references
            .entry(kind.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn apply_extension(&mut self, name: &str, value: &str) {
        self.record
            .extensions
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn apply_context(&mut self, outcome: ContextOutcome, from: usize, to: usize) {
        let location = SourceLocation::new(self.path, from, to);
        match outcome {
            ContextOutcome::Pending => {}
            ContextOutcome::Value(value) => self.record.context = Some(value),
            ContextOutcome::NotStructured(value) => {
                self.record.context = Some(value);
                self.diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::ContextNotStructured,
                        "context value is not a JSON object; kept as text",
                    )
                    .at(location),
                );
            }
            ContextOutcome::Invalid(reason) => self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticKind::InvalidContext,
                    format!("invalid context value: {reason}"),
                )
                .at(location),
            ),
            ContextOutcome::Unbalanced => self.diagnostics.push(
                Diagnostic::error(DiagnosticKind::UnbalancedContext, "unbalanced context block")
                    .at(location),
            ),
        }
    }

    fn finish(self) -> Option<ParsedBlock> {
        if !self.recognized {
            return None;
        }
        Some(ParsedBlock {
            record: self.record,
            diagnostics: self.diagnostics,
        })
    }
}
