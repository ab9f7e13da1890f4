//! Recognized annotation keys.
//!
//! The vocabulary is open: keys outside the known table are classified as
//! references (by naming convention) or kept as extensions, never rejected.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownField {
    Phase,
    Status,
    Pattern,
    Strategy,
    Details,
    Note,
    History,
    Change,
    Version,
    TrainHash,
    CompilerErr,
    RuntimeErr,
    FixReason,
    HumanOverride,
    Implementation,
    Context,
    AssignedTo,
    ClaimedAt,
    EstimatedTime,
    Priority,
    Complexity,
    Timeout,
    RetryCount,
    MaxRetries,
    Dependencies,
    Blocks,
    Bounty,
}

const KNOWN_FIELDS: &[(&str, KnownField)] = &[
    ("AI_PHASE", KnownField::Phase),
    ("AI_STATUS", KnownField::Status),
    ("AI_PATTERN", KnownField::Pattern),
    ("AI_STRATEGY", KnownField::Strategy),
    ("AI_DETAILS", KnownField::Details),
    ("AI_NOTE", KnownField::Note),
    ("AI_HISTORY", KnownField::History),
    ("AI_CHANGE", KnownField::Change),
    ("AI_VERSION", KnownField::Version),
    ("AI_TRAIN_HASH", KnownField::TrainHash),
    ("COMPILER_ERR", KnownField::CompilerErr),
    ("RUNTIME_ERR", KnownField::RuntimeErr),
    ("FIX_REASON", KnownField::FixReason),
    ("HUMAN_OVERRIDE", KnownField::HumanOverride),
    ("AROS_IMPL", KnownField::Implementation),
    ("AI_CONTEXT", KnownField::Context),
    ("AI_ASSIGNED_TO", KnownField::AssignedTo),
    ("AI_CLAIMED_AT", KnownField::ClaimedAt),
    ("AI_ESTIMATED_TIME", KnownField::EstimatedTime),
    ("AI_PRIORITY", KnownField::Priority),
    ("AI_COMPLEXITY", KnownField::Complexity),
    ("AI_TIMEOUT", KnownField::Timeout),
    ("AI_RETRY_COUNT", KnownField::RetryCount),
    ("AI_MAX_RETRIES", KnownField::MaxRetries),
    ("AI_DEPENDENCIES", KnownField::Dependencies),
    ("AI_BLOCKS", KnownField::Blocks),
    ("AI_BOUNTY", KnownField::Bounty),
];

impl KnownField {
    pub fn from_key(key: &str) -> Option<Self> {
        KNOWN_FIELDS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, field)| *field)
    }

    pub fn key(&self) -> &'static str {
        KNOWN_FIELDS
            .iter()
            .find(|(_, field)| field == self)
            .map(|(k, _)| *k)
            .unwrap_or("AI_UNKNOWN")
    }

    /// Fields whose repeated occurrences merge instead of replacing.
    pub fn accumulates(&self) -> bool {
        matches!(self, KnownField::Dependencies | KnownField::Blocks)
    }

    pub fn all() -> impl Iterator<Item = KnownField> {
        KNOWN_FIELDS.iter().map(|(_, field)| *field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    Known(KnownField),
    /// `REF_*` or `*_REF`: values accumulate under the key as written.
    Reference(&'a str),
    Extension(&'a str),
}

impl<'a> FieldKey<'a> {
    pub fn classify(key: &'a str) -> Self {
        if let Some(field) = KnownField::from_key(key) {
            return FieldKey::Known(field);
        }
        if is_reference_key(key) {
            return FieldKey::Reference(key);
        }
        FieldKey::Extension(key)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldKey::Extension(_))
    }
}

pub fn is_reference_key(key: &str) -> bool {
    (key.starts_with("REF_") && key.len() > 4) || (key.ends_with("_REF") && key.len() > 4)
}

static KEY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Z][A-Z0-9_]*[A-Z0-9]):\s*(.*?)\s*$")
        .expect("constant regex pattern is valid")
});

/// Splits `KEY: value` into its parts. The value is trimmed and may be empty.
pub fn split_key_line(line: &str) -> Option<(&str, &str)> {
    let caps = KEY_LINE.captures(line)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((key, value))
}
