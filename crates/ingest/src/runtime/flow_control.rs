use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

/// Gatekeeper consulted before each item starts.
///
/// Cancellation is cooperative: once the token is cancelled no new item is
/// admitted, but items already admitted run to completion.
#[derive(Debug)]
pub struct FlowController {
    cancel: CancellationToken,
    admitted: AtomicUsize,
    refused: AtomicUsize,
}

impl FlowController {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            admitted: AtomicUsize::new(0),
            refused: AtomicUsize::new(0),
        }
    }

    pub fn admit(&self) -> bool {
        if self.cancel.is_cancelled() {
            self.refused.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.admitted.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn admitted(&self) -> usize {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }
}
