use super::source::SourceLocation;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a record in a report, in file-then-line order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotStarted,
    Partial,
    Implemented,
    Fixed,
    NeedsRefactor,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::NotStarted,
        Status::Partial,
        Status::Implemented,
        Status::Fixed,
        Status::NeedsRefactor,
        Status::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "NOT_STARTED",
            Status::Partial => "PARTIAL",
            Status::Implemented => "IMPLEMENTED",
            Status::Fixed => "FIXED",
            Status::NeedsRefactor => "NEEDS_REFACTOR",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Exact, case-sensitive match against the annotation spelling.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Complexity {
    Low,
    Medium,
    High,
    Critical,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "LOW",
            Complexity::Medium => "MEDIUM",
            Complexity::High => "HIGH",
            Complexity::Critical => "CRITICAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(Complexity::Low),
            "MEDIUM" => Some(Complexity::Medium),
            "HIGH" => Some(Complexity::High),
            "CRITICAL" => Some(Complexity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured content of one breadcrumb comment block.
///
/// Values are kept as written: an out-of-range priority stays out of range
/// here and is only clamped by the report's priority index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BreadcrumbRecord {
    pub phase: Option<String>,
    pub status: Option<Status>,
    pub pattern: Option<String>,
    pub strategy: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<i64>,
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub dependencies: IndexSet<String>,
    #[serde(default)]
    pub blocks: IndexSet<String>,
    pub context: Option<serde_json::Value>,
    /// Reference kind (`REF_GITHUB_ISSUE`, `LINUX_REF`, ...) to every value in file order.
    #[serde(default)]
    pub references: IndexMap<String, Vec<String>>,
    pub retry_count: Option<u32>,
    pub max_retries: Option<u32>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub timeout: Option<DateTime<Utc>>,

    // free text
    pub details: Option<String>,
    pub note: Option<String>,
    pub history: Option<String>,
    pub change: Option<String>,
    pub version: Option<String>,
    pub train_hash: Option<String>,
    pub compiler_err: Option<String>,
    pub runtime_err: Option<String>,
    pub fix_reason: Option<String>,
    pub human_override: Option<String>,
    pub implementation: Option<String>,
    pub estimated_time: Option<String>,
    pub bounty: Option<String>,

    /// Unrecognized keys, verbatim, every occurrence in file order.
    #[serde(default)]
    pub extensions: IndexMap<String, Vec<String>>,
    /// Name of the declaration following the comment block, if any.
    pub declaration: Option<String>,
    pub location: SourceLocation,
}

impl BreadcrumbRecord {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            phase: None,
            status: None,
            pattern: None,
            strategy: None,
            assigned_to: None,
            priority: None,
            complexity: None,
            dependencies: IndexSet::new(),
            blocks: IndexSet::new(),
            context: None,
            references: IndexMap::new(),
            retry_count: None,
            max_retries: None,
            claimed_at: None,
            timeout: None,
            details: None,
            note: None,
            history: None,
            change: None,
            version: None,
            train_hash: None,
            compiler_err: None,
            runtime_err: None,
            fix_reason: None,
            human_override: None,
            implementation: None,
            estimated_time: None,
            bounty: None,
            extensions: IndexMap::new(),
            declaration: None,
            location,
        }
    }

    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    /// Every phase this record points at, through either relation.
    pub fn referenced_phases(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.blocks.iter())
            .map(String::as_str)
    }
}
