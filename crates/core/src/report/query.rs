use crate::model::{Diagnostic, RecordId, Severity, Status};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::RecordEntry;

/// Query over a finished report, e.g.
/// `{"command": "phase", "phase": "MEMORY_MANAGER", "latest": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BreadcrumbQuery {
    /// Records of one phase in source order
    Phase {
        phase: String,
        /// Only the most recent record (last in file-then-line order)
        #[serde(default)]
        latest: bool,
    },

    Status { status: Status },

    Assignee { assignee: String },

    /// Highest clamped priority first
    Priority {
        #[serde(default = "default_limit")]
        limit: usize,
        /// Drop records whose clamped priority is below this
        #[serde(default)]
        min: Option<i64>,
    },

    Diagnostics {
        #[serde(default)]
        severity: Option<Severity>,
        #[serde(default)]
        record: Option<RecordId>,
    },

    /// Records without `AI_PHASE`
    Unindexed,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct QueryResult {
    pub records: Vec<RecordEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl QueryResult {
    pub fn records<'a>(records: impl IntoIterator<Item = &'a RecordEntry>) -> Self {
        Self {
            records: records.into_iter().cloned().collect(),
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        Self {
            records: Vec::new(),
            diagnostics: diagnostics.into_iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.diagnostics.is_empty()
    }
}
