//! `AI_CONTEXT` sub-parser.
//!
//! Two states: `Outside`, and `InsideAwaitingClose` after an `AI_CONTEXT: {`
//! line. While inside, every line is buffered until the braces balance on a
//! line holding only `}`. Braces inside JSON strings do not count.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ContextOutcome {
    /// Still collecting lines, or nothing to report.
    Pending,
    Value(Value),
    /// Parsed, but not an object. Kept as a JSON string.
    NotStructured(Value),
    Invalid(String),
    Unbalanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Outside,
    InsideAwaitingClose {
        opened_at: usize,
        buffer: String,
        depth: i64,
    },
}

#[derive(Debug, Clone)]
pub struct ContextParser {
    state: State,
}

impl Default for ContextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextParser {
    pub fn new() -> Self {
        Self {
            state: State::Outside,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::InsideAwaitingClose { .. })
    }

    /// Line number of the `AI_CONTEXT: {` that opened the current region.
    pub fn opened_at(&self) -> Option<usize> {
        match &self.state {
            State::InsideAwaitingClose { opened_at, .. } => Some(*opened_at),
            State::Outside => None,
        }
    }

    /// Handles the value of an `AI_CONTEXT:` line.
    ///
    /// A lone `{` opens a multi-line region; anything else is parsed on the
    /// spot. Opening while already open discards the previous region as
    /// unbalanced.
    pub fn open(&mut self, value: &str, line: usize) -> ContextOutcome {
        let previous = self.abort();
        let value = value.trim();
        if value == "{" {
            self.state = State::InsideAwaitingClose {
                opened_at: line,
                buffer: String::from("{"),
                depth: 1,
            };
            return previous;
        }
        parse_single(value)
    }

    pub fn feed(&mut self, line: &str) -> ContextOutcome {
        let State::InsideAwaitingClose { buffer, depth, .. } = &mut self.state else {
            return ContextOutcome::Pending;
        };

        buffer.push('\n');
        buffer.push_str(line);
        *depth += brace_delta(line);

        if *depth <= 0 && line.trim() == "}" {
            let text = std::mem::take(buffer);
            self.state = State::Outside;
            return parse_structured(&text);
        }
        ContextOutcome::Pending
    }

    /// Closes an open region without its `}`.
    pub fn abort(&mut self) -> ContextOutcome {
        match std::mem::replace(&mut self.state, State::Outside) {
            State::InsideAwaitingClose { .. } => ContextOutcome::Unbalanced,
            State::Outside => ContextOutcome::Pending,
        }
    }
}

fn parse_single(value: &str) -> ContextOutcome {
    if value.starts_with('{') {
        if brace_delta(value) != 0 {
            return ContextOutcome::Unbalanced;
        }
        return parse_structured(value);
    }
    ContextOutcome::NotStructured(Value::String(value.to_string()))
}

fn parse_structured(text: &str) -> ContextOutcome {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => ContextOutcome::Value(value),
        Ok(_) => ContextOutcome::NotStructured(Value::String(text.to_string())),
        Err(e) => ContextOutcome::Invalid(e.to_string()),
    }
}

/// Opening minus closing braces, ignoring those inside string literals.
pub fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}
