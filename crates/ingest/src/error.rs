use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("worker pool could not be built: {0}")]
    PoolBuild(String),
    #[error("execution failed: {0}")]
    Execution(String),
}
