use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::traits::{Executor, ProgressObserver};
use crate::types::{DispatchReport, DispatchStats, ItemOutcome, RuntimeConfig, WorkItem};

pub mod flow_control;

pub use flow_control::FlowController;

/// Runs independent work items on a bounded worker pool and joins the
/// results back into submission order.
pub struct Dispatcher {
    pool: rayon::ThreadPool,
    workers: usize,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(config: &RuntimeConfig) -> Result<Self, IngestError> {
        Self::with_cancellation(config, CancellationToken::new())
    }

    pub fn with_cancellation(
        config: &RuntimeConfig,
        cancel: CancellationToken,
    ) -> Result<Self, IngestError> {
        let workers = config.resolved_workers().max(1);
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| IngestError::PoolBuild(e.to_string()))?;

        debug!("Dispatcher ready with {} workers", workers);
        Ok(Self {
            pool,
            workers,
            cancel,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run<P, O, E, M>(
        &self,
        items: Vec<WorkItem<P>>,
        executor: &E,
        observer: &M,
    ) -> DispatchReport<O>
    where
        P: Send,
        O: Send,
        E: Executor<P, O> + ?Sized,
        M: ProgressObserver<O> + ?Sized,
    {
        let submitted = items.len();
        let flow = FlowController::new(self.cancel.clone());

        let mut outcomes: Vec<ItemOutcome<O>> = self.pool.install(|| {
            items
                .into_par_iter()
                .map(|item| {
                    if !flow.admit() {
                        observer.on_skipped(item.seq, &item.key);
                        return ItemOutcome::Skipped {
                            seq: item.seq,
                            key: item.key,
                        };
                    }

                    let seq = item.seq;
                    let key = item.key.clone();
                    observer.on_started(seq, &key);
                    let output = executor.execute(item);
                    observer.on_completed(seq, &key, &output);
                    ItemOutcome::Completed { seq, key, output }
                })
                .collect()
        });

        // Indexed parallel collection keeps order already; callers may hand in
        // items whose seq values are not 0..n, so sort on seq explicitly.
        outcomes.sort_by_key(ItemOutcome::seq);

        let stats = DispatchStats {
            submitted,
            completed: flow.admitted(),
            skipped: flow.refused(),
            workers: self.workers,
        };
        let cancelled = stats.skipped > 0;
        if cancelled {
            info!(
                "Dispatch cancelled: {} of {} items skipped",
                stats.skipped, stats.submitted
            );
        } else {
            debug!("Dispatch finished: {} items", stats.completed);
        }

        DispatchReport {
            outcomes,
            stats,
            cancelled,
        }
    }
}
