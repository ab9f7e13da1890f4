use crate::types::WorkItem;

/// Runs one unit of work. Implementations must not share mutable state
/// between calls; the dispatcher invokes them from several threads at once.
pub trait Executor<P, O>: Send + Sync {
    fn execute(&self, item: WorkItem<P>) -> O;
}

/// Receives progress notifications while a batch is dispatched.
pub trait ProgressObserver<O>: Send + Sync {
    fn on_started(&self, _seq: usize, _key: &str) {}
    fn on_completed(&self, _seq: usize, _key: &str, _output: &O) {}
    fn on_skipped(&self, _seq: usize, _key: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<O> ProgressObserver<O> for NoopObserver {}
