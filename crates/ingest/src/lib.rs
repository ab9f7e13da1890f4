pub mod error;
pub mod runtime;
pub mod traits;
pub mod types;

pub use error::IngestError;
pub use runtime::{Dispatcher, FlowController};
pub use tokio_util::sync::CancellationToken;
pub use traits::{Executor, NoopObserver, ProgressObserver};
pub use types::{DispatchReport, DispatchStats, ItemOutcome, RuntimeConfig, WorkItem};
