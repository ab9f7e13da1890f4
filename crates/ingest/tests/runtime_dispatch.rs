use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crumbtrail_ingest::{
    CancellationToken, Dispatcher, Executor, ItemOutcome, NoopObserver, ProgressObserver,
    RuntimeConfig, WorkItem,
};

fn items(n: usize) -> Vec<WorkItem<u32>> {
    (0..n)
        .map(|i| WorkItem::new(i, format!("item-{i}"), i as u32))
        .collect()
}

struct Doubler;
impl Executor<u32, u32> for Doubler {
    fn execute(&self, item: WorkItem<u32>) -> u32 {
        item.payload * 2
    }
}

/// Cancels the shared token once it has processed `after` items.
struct CancelAfter {
    token: CancellationToken,
    after: usize,
    seen: AtomicUsize,
}
impl Executor<u32, u32> for CancelAfter {
    fn execute(&self, item: WorkItem<u32>) -> u32 {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
        item.payload
    }
}

#[derive(Default)]
struct RecordingObserver {
    started: Mutex<Vec<usize>>,
    completed: Mutex<Vec<usize>>,
    skipped: Mutex<Vec<usize>>,
}
impl ProgressObserver<u32> for RecordingObserver {
    fn on_started(&self, seq: usize, _key: &str) {
        self.started.lock().expect("lock poisoned").push(seq);
    }
    fn on_completed(&self, seq: usize, _key: &str, _output: &u32) {
        self.completed.lock().expect("lock poisoned").push(seq);
    }
    fn on_skipped(&self, seq: usize, _key: &str) {
        self.skipped.lock().expect("lock poisoned").push(seq);
    }
}

#[test]
fn dispatch_preserves_submission_order() {
    let dispatcher = Dispatcher::new(&RuntimeConfig::default().with_workers(4)).unwrap();
    let report = dispatcher.run(items(64), &Doubler, &NoopObserver);

    assert!(!report.cancelled);
    assert_eq!(report.stats.submitted, 64);
    assert_eq!(report.stats.completed, 64);
    assert_eq!(report.stats.skipped, 0);
    assert_eq!(report.stats.workers, 4);

    let outputs: Vec<u32> = report.into_completed();
    let expected: Vec<u32> = (0..64).map(|i| i * 2).collect();
    assert_eq!(outputs, expected);
}

#[test]
fn dispatch_restores_order_from_seq() {
    let dispatcher = Dispatcher::new(&RuntimeConfig::default().with_workers(2)).unwrap();
    let shuffled = vec![
        WorkItem::new(2, "c", 3u32),
        WorkItem::new(0, "a", 1u32),
        WorkItem::new(1, "b", 2u32),
    ];
    let report = dispatcher.run(shuffled, &Doubler, &NoopObserver);
    let keys: Vec<&str> = report.outcomes.iter().map(ItemOutcome::key).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn cancelled_before_start_skips_everything() {
    let token = CancellationToken::new();
    token.cancel();
    let dispatcher =
        Dispatcher::with_cancellation(&RuntimeConfig::default().with_workers(2), token).unwrap();
    let observer = RecordingObserver::default();

    let report = dispatcher.run(items(5), &Doubler, &observer);

    assert!(report.cancelled);
    assert_eq!(report.stats.completed, 0);
    assert_eq!(report.stats.skipped, 5);
    assert!(report.outcomes.iter().all(|o| o.output().is_none()));
    assert_eq!(observer.skipped.lock().unwrap().len(), 5);
    assert!(observer.started.lock().unwrap().is_empty());
}

#[test]
fn cancellation_mid_batch_lets_started_items_finish() {
    let token = CancellationToken::new();
    let dispatcher = Dispatcher::with_cancellation(
        &RuntimeConfig::default().with_workers(1),
        token.clone(),
    )
    .unwrap();
    let executor = CancelAfter {
        token,
        after: 3,
        seen: AtomicUsize::new(0),
    };
    let observer = RecordingObserver::default();

    let report = dispatcher.run(items(10), &executor, &observer);

    assert!(report.cancelled);
    assert_eq!(report.stats.completed, 3);
    assert_eq!(report.stats.skipped, 7);
    // Every started item also completed: nothing is interrupted mid-flight.
    let mut started = observer.started.lock().unwrap().clone();
    let mut completed = observer.completed.lock().unwrap().clone();
    started.sort_unstable();
    completed.sort_unstable();
    assert_eq!(started, completed);
    assert_eq!(report.outcomes.len(), 10);
}

#[test]
fn zero_workers_resolves_to_available_parallelism() {
    let config = RuntimeConfig::default();
    assert!(config.resolved_workers() >= 1);
    let dispatcher = Dispatcher::new(&config).unwrap();
    assert_eq!(dispatcher.workers(), config.resolved_workers());
}
