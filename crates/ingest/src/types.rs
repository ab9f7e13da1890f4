/// A single item submitted to the dispatcher.
///
/// `seq` is the position in the submitted batch and is used to restore
/// input order after parallel execution. `key` is a human readable label
/// (usually a file path) used for logging.
#[derive(Debug, Clone)]
pub struct WorkItem<P> {
    pub seq: usize,
    pub key: String,
    pub payload: P,
}

impl<P> WorkItem<P> {
    pub fn new(seq: usize, key: impl Into<String>, payload: P) -> Self {
        Self {
            seq,
            key: key.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<O> {
    Completed { seq: usize, key: String, output: O },
    /// The item was never started because the batch was cancelled first.
    Skipped { seq: usize, key: String },
}

impl<O> ItemOutcome<O> {
    pub fn seq(&self) -> usize {
        match self {
            ItemOutcome::Completed { seq, .. } | ItemOutcome::Skipped { seq, .. } => *seq,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ItemOutcome::Completed { key, .. } | ItemOutcome::Skipped { key, .. } => key,
        }
    }

    pub fn output(&self) -> Option<&O> {
        match self {
            ItemOutcome::Completed { output, .. } => Some(output),
            ItemOutcome::Skipped { .. } => None,
        }
    }

    pub fn into_output(self) -> Option<O> {
        match self {
            ItemOutcome::Completed { output, .. } => Some(output),
            ItemOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub submitted: usize,
    pub completed: usize,
    pub skipped: usize,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct DispatchReport<O> {
    /// Outcomes in submission order.
    pub outcomes: Vec<ItemOutcome<O>>,
    pub stats: DispatchStats,
    pub cancelled: bool,
}

impl<O> DispatchReport<O> {
    pub fn into_completed(self) -> Vec<O> {
        self.outcomes
            .into_iter()
            .filter_map(ItemOutcome::into_output)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads. Zero means one per available core.
    pub workers: usize,
    pub thread_name_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name_prefix: "crumbtrail-worker".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
