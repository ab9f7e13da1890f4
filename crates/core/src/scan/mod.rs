//! Scanning: path collection and the parallel per-file pipeline.

pub mod pipeline;
pub mod scanner;

pub use pipeline::{FilePipeline, ScanInput, ScanObserver};
pub use scanner::Scanner;
