use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corpus totals, as printed by `crumbtrail stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Statistics {
    pub total_records: usize,
    pub valid_records: usize,
    pub files_scanned: usize,
    pub files_with_breadcrumbs: usize,
    pub phases: BTreeMap<String, usize>,
    /// Keyed by annotation spelling (`FIXED`, `PARTIAL`, ...).
    pub statuses: BTreeMap<String, usize>,
    pub unindexed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Statistics {
    pub fn invalid_records(&self) -> usize {
        self.total_records - self.valid_records
    }
}
