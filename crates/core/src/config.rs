use crate::error::{CrumbError, Result};
use crumbtrail_ingest::RuntimeConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "crumbtrail.json";
pub const WORKERS_ENV: &str = "CRUMBTRAIL_WORKERS";
pub const MAX_FILES_ENV: &str = "CRUMBTRAIL_MAX_FILES";

pub const DEFAULT_EXTENSIONS: &[&str] = &["c", "h", "cpp", "hpp"];

/// Scan settings.
///
/// Precedence, lowest first: defaults, config file, environment, explicit
/// overrides applied by the caller (CLI flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads for per-file processing. Zero means one per core.
    pub workers: usize,
    /// File extensions to scan, without the leading dot.
    pub extensions: Vec<String>,
    /// Stop after this many files (in sorted path order).
    pub max_files: Option<usize>,
    pub follow_links: bool,
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_files: None,
            follow_links: false,
            include_hidden: false,
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CrumbError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: ScanConfig = serde_json::from_str(&raw).map_err(|e| {
            CrumbError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;
        Ok(config.normalized())
    }

    /// Loads `crumbtrail.json` from `root` when present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if root.is_dir() && candidate.is_file() {
            tracing::debug!("Using config file {}", candidate.display());
            return Self::from_file(&candidate);
        }
        Ok(Self::default())
    }

    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(WORKERS_ENV) {
            self.workers = raw.trim().parse().map_err(|_| {
                CrumbError::Config(format!("{WORKERS_ENV} must be a non-negative integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup(MAX_FILES_ENV) {
            let max: usize = raw.trim().parse().map_err(|_| {
                CrumbError::Config(format!("{MAX_FILES_ENV} must be a non-negative integer, got '{raw}'"))
            })?;
            self.max_files = Some(max);
        }
        Ok(self)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self.normalized()
    }

    pub fn with_max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }

    /// Accepts `.c`, `C` and `c` alike.
    pub fn normalized(mut self) -> Self {
        self.extensions = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self.extensions.dedup();
        self
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

impl From<&ScanConfig> for RuntimeConfig {
    fn from(value: &ScanConfig) -> Self {
        RuntimeConfig::default().with_workers(value.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [(WORKERS_ENV, "3"), (MAX_FILES_ENV, "10")].into();
        let config = ScanConfig::default()
            .with_workers(8)
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.max_files, Some(10));
    }

    #[test]
    fn bad_env_value_is_config_error() {
        let err = ScanConfig::default()
            .apply_env_from(|k| (k == WORKERS_ENV).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, CrumbError::Config(_)));
    }

    #[test]
    fn extensions_are_normalized() {
        let config = ScanConfig::default().with_extensions([".C", "h", " .Hpp "]);
        assert_eq!(config.extensions, vec!["c", "h", "hpp"]);
        assert!(config.matches_extension(&PathBuf::from("src/a.C")));
        assert!(!config.matches_extension(&PathBuf::from("src/a.rs")));
        assert!(!config.matches_extension(&PathBuf::from("Makefile")));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "workers": 2 }"#).unwrap();
        let config = ScanConfig::discover(dir.path()).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.extensions, ScanConfig::default().extensions);
    }

    #[test]
    fn malformed_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ workers: ").unwrap();
        assert!(matches!(ScanConfig::from_file(&path), Err(CrumbError::Config(_))));
    }
}
