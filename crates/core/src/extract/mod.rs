//! Annotation Extractor: locates comment blocks that may carry breadcrumbs.
//!
//! Extraction is a single forward pass over the file's lines. Line comments
//! merge into one block while they are consecutive; a block comment span is
//! always one block. Blocks without any `KEY:` line are prose and are
//! skipped here, so the parser only sees candidates.

pub mod declaration;

use crate::model::vocabulary::split_key_line;
use crate::model::{CommentSyntax, Diagnostic, DiagnosticKind, SourceLocation, SourceUnit};
use serde::Serialize;
use std::path::Path;

pub use declaration::{declaration_after, declared_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Line,
    Block,
}

/// One comment line with its markers removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentLine {
    /// 1-based source line number.
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentBlock {
    pub kind: CommentKind,
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<CommentLine>,
    pub declaration: Option<String>,
}

impl CommentBlock {
    pub fn has_key_pattern(&self) -> bool {
        self.lines.iter().any(|l| split_key_line(&l.text).is_some())
    }

    pub fn location(&self, path: &Path) -> SourceLocation {
        SourceLocation::new(path, self.start_line, self.end_line)
    }
}

/// Lazily yields the candidate blocks of `unit`.
///
/// An unterminated block comment yields one error diagnostic and ends the
/// iteration; blocks before it have already been yielded.
pub fn extract_blocks(unit: &SourceUnit) -> CommentBlocks<'_> {
    CommentBlocks {
        path: &unit.path,
        lines: unit.text.lines().collect(),
        syntax: unit.syntax,
        next: 0,
        finished: false,
    }
}

pub struct CommentBlocks<'a> {
    path: &'a Path,
    lines: Vec<&'a str>,
    syntax: CommentSyntax,
    next: usize,
    finished: bool,
}

impl<'a> CommentBlocks<'a> {
    fn opens_block(&self, line: &str) -> bool {
        self.syntax
            .block_delimiters()
            .map(|(open, _)| line.trim_start().starts_with(open))
            .unwrap_or(false)
    }

    fn is_line_comment(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.syntax.line_marker()) && !self.opens_block(line)
    }

    fn take_line_run(&mut self) -> CommentBlock {
        let start = self.next;
        let mut lines = Vec::new();
        while self.next < self.lines.len() && self.is_line_comment(self.lines[self.next]) {
            let text = strip_line_marker(self.lines[self.next], self.syntax.line_marker());
            lines.push(CommentLine {
                number: self.next + 1,
                text,
            });
            self.next += 1;
        }
        CommentBlock {
            kind: CommentKind::Line,
            start_line: start + 1,
            end_line: self.next,
            lines,
            declaration: None,
        }
    }

    /// Takes one block comment span. Also returns the text after the closer
    /// on the closing line.
    fn take_block_span(
        &mut self,
        open: &str,
        close: &str,
    ) -> Result<(CommentBlock, &'a str), Diagnostic> {
        let start = self.next;
        let mut lines = Vec::new();
        let first: &'a str = self.lines[start].trim_start();
        let mut rest: &'a str = strip_opener(&first[open.len()..], close);

        let mut idx = start;
        loop {
            if let Some(pos) = rest.find(close) {
                lines.push(CommentLine {
                    number: idx + 1,
                    text: block_line_text(&rest[..pos], idx == start),
                });
                self.next = idx + 1;
                let tail = &rest[pos + close.len()..];
                let block = CommentBlock {
                    kind: CommentKind::Block,
                    start_line: start + 1,
                    end_line: idx + 1,
                    lines,
                    declaration: None,
                };
                return Ok((block, tail));
            }
            lines.push(CommentLine {
                number: idx + 1,
                text: block_line_text(rest, idx == start),
            });
            idx += 1;
            if idx >= self.lines.len() {
                break;
            }
            rest = self.lines[idx];
        }

        self.next = self.lines.len();
        let end = self.lines.len().max(start + 1);
        Err(Diagnostic::error(
            DiagnosticKind::UnterminatedBlockComment,
            "unterminated block comment",
        )
        .at(SourceLocation::new(self.path, start + 1, end)))
    }

    /// `/* AI_PHASE: X */ int x;` declares `x` on the closing line.
    fn trailing_declaration(&self, tail: &str) -> Option<String> {
        let code = tail.trim();
        if code.is_empty() || code.starts_with(self.syntax.line_marker()) || self.opens_block(code)
        {
            return None;
        }
        declared_name(code)
    }
}

impl<'a> Iterator for CommentBlocks<'a> {
    type Item = Result<CommentBlock, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while self.next < self.lines.len() {
            let line = self.lines[self.next];

            let (candidate, tail) = if let Some((open, close)) = self
                .syntax
                .block_delimiters()
                .filter(|_| self.opens_block(line))
            {
                match self.take_block_span(open, close) {
                    Ok(spanned) => spanned,
                    Err(diagnostic) => {
                        self.finished = true;
                        return Some(Err(diagnostic));
                    }
                }
            } else if self.is_line_comment(line) {
                (self.take_line_run(), "")
            } else {
                self.next += 1;
                continue;
            };

            if !candidate.has_key_pattern() {
                continue;
            }

            let declaration = self
                .trailing_declaration(tail)
                .or_else(|| declaration_after(&self.lines, self.next, self.syntax));
            return Some(Ok(CommentBlock {
                declaration,
                ..candidate
            }));
        }

        self.finished = true;
        None
    }
}

impl std::iter::FusedIterator for CommentBlocks<'_> {}

/// `/// AI_NOTE: x` and `//! AI_NOTE: x` both become `AI_NOTE: x`.
fn strip_line_marker(line: &str, marker: &str) -> String {
    let trimmed = line.trim_start();
    let body = trimmed.strip_prefix(marker).unwrap_or(trimmed);
    let extra = marker.chars().next().unwrap_or('/');
    body.trim_start_matches(|c: char| c == extra || c == '!')
        .trim()
        .to_string()
}

/// Drops the extra characters of doc openers (`/**`, `/*!`), but not the
/// closer of an empty `/**/`.
fn strip_opener<'s>(rest: &'s str, close: &str) -> &'s str {
    if rest.starts_with(close) {
        return rest;
    }
    rest.trim_start_matches(['*', '!'])
}

fn block_line_text(raw: &str, first: bool) -> String {
    let trimmed = raw.trim();
    if first {
        return trimmed.to_string();
    }
    // Continuation decoration: ` * AI_STATUS: FIXED`
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(text: &str) -> Vec<Result<CommentBlock, Diagnostic>> {
        extract_blocks(&SourceUnit::new("t.c", text)).collect()
    }

    fn texts(block: &CommentBlock) -> Vec<&str> {
        block.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn line_run_is_one_block() {
        let out = blocks("// AI_PHASE: A\n// AI_STATUS: FIXED\nint a(void);\n");
        assert_eq!(out.len(), 1);
        let block = out[0].as_ref().unwrap();
        assert_eq!(block.kind, CommentKind::Line);
        assert_eq!((block.start_line, block.end_line), (1, 2));
        assert_eq!(texts(block), vec!["AI_PHASE: A", "AI_STATUS: FIXED"]);
        assert_eq!(block.declaration.as_deref(), Some("a"));
    }

    #[test]
    fn blank_line_splits_runs() {
        let out = blocks("// AI_PHASE: A\n\n// AI_PHASE: B\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].as_ref().unwrap().start_line, 3);
    }

    #[test]
    fn block_span_with_decoration() {
        let text = "/**\n * AI_PHASE: GPU\n *\n * AI_STATUS: PARTIAL\n */\nstatic int gpu_init(void)\n";
        let out = blocks(text);
        assert_eq!(out.len(), 1);
        let block = out[0].as_ref().unwrap();
        assert_eq!(block.kind, CommentKind::Block);
        assert_eq!((block.start_line, block.end_line), (1, 5));
        assert_eq!(texts(block), vec!["", "AI_PHASE: GPU", "", "AI_STATUS: PARTIAL", ""]);
        assert_eq!(block.declaration.as_deref(), Some("gpu_init"));
    }

    #[test]
    fn single_line_block() {
        let out = blocks("/* AI_PHASE: X */ int x;\n");
        let block = out[0].as_ref().unwrap();
        assert_eq!((block.start_line, block.end_line), (1, 1));
        assert_eq!(texts(block), vec!["AI_PHASE: X"]);
        assert_eq!(block.declaration.as_deref(), Some("x"));
    }

    #[test]
    fn code_after_multi_line_closer_is_the_declaration() {
        let out = blocks("/*\n * AI_PHASE: Y\n */ static int ready;\nint later(void);\n");
        assert_eq!(out[0].as_ref().unwrap().declaration.as_deref(), Some("ready"));

        let out = blocks("/* AI_PHASE: Z */ // trailing note\nvoid z(void);\n");
        assert_eq!(out[0].as_ref().unwrap().declaration.as_deref(), Some("z"));
    }

    #[test]
    fn prose_is_dropped() {
        let out = blocks("// just a note\n// about nothing\nint f();\n/* more prose */\n");
        assert!(out.is_empty());
    }

    #[test]
    fn doc_markers_are_stripped() {
        let out = blocks("/// AI_PHASE: DOC\n//! AI_NOTE: inner\n");
        assert_eq!(texts(out[0].as_ref().unwrap()), vec!["AI_PHASE: DOC", "AI_NOTE: inner"]);
    }

    #[test]
    fn unterminated_block_stops_extraction() {
        let out = blocks("// AI_PHASE: FIRST\nint a;\n/* AI_PHASE: BROKEN\n\n// AI_PHASE: NEVER\n");
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        let diag = out[1].as_ref().unwrap_err();
        assert_eq!(diag.kind, DiagnosticKind::UnterminatedBlockComment);
        assert_eq!(diag.message, "unterminated block comment");
        assert_eq!(diag.location.as_ref().map(|l| l.start_line), Some(3));
    }

    #[test]
    fn block_opener_ends_a_line_run() {
        let out = blocks("// AI_PHASE: A\n/* AI_PHASE: B */\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().end_line, 1);
        assert_eq!(out[1].as_ref().unwrap().kind, CommentKind::Block);
    }

    #[test]
    fn hash_and_lua_syntaxes() {
        let py = SourceUnit::new("tool.py", "# AI_PHASE: PY\n## AI_STATUS: FIXED\ndef run():\n");
        let out: Vec<_> = extract_blocks(&py).collect();
        assert_eq!(texts(out[0].as_ref().unwrap()), vec!["AI_PHASE: PY", "AI_STATUS: FIXED"]);

        let lua = SourceUnit::new("init.lua", "--[[\nAI_PHASE: LUA\n]]\n-- AI_NOTE: x\nlocal function boot()\n");
        let out: Vec<_> = extract_blocks(&lua).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().kind, CommentKind::Block);
        assert_eq!(out[1].as_ref().unwrap().declaration.as_deref(), Some("boot"));
    }
}
