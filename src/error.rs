use std::path::PathBuf;

/// Custom Result type for motorank operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the motorank library, encompassing all possible error cases
/// that can occur while loading, ranking, and reporting records.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors related to validating the pipeline configuration
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Errors that occur while loading input records
    #[error(transparent)]
    LoadError(#[from] LoadError),
    /// Errors that occur while persisting the report
    #[error(transparent)]
    ReportError(#[from] ReportError),
    /// Standard I/O errors from the Rust standard library
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Malformed JSON input
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    /// A worker thread panicked before observing the closed buffer
    ///
    /// # Arguments
    /// * `usize` - The id of the worker that panicked
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
    /// Every worker stopped before the producer could push all records
    #[error("Bounded buffer was abandoned by its consumers")]
    BufferAbandoned,
    /// Generic errors that can occur in any part of the system
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

/// Errors raised while validating a [`Config`](crate::Config)
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A bounded buffer must be able to hold at least one item
    #[error("Buffer capacity must be at least 1")]
    ZeroCapacity,

    /// A pipeline needs at least one worker to drain its buffer
    #[error("Pipeline needs at least one worker")]
    ZeroWorkers,

    /// The buffer is larger than the number of records it will ever hold
    ///
    /// # Fields
    /// * `capacity` - The requested buffer capacity
    /// * `records` - The expected number of input records
    #[error("Buffer capacity ({capacity}) exceeds the expected number of records ({records})")]
    CapacityExceedsRecords { capacity: usize, records: usize },
}

/// Errors that can occur while loading input records
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// The input holds a different number of records than configured
    ///
    /// # Fields
    /// * `expected` - The configured number of records
    /// * `got` - The number of records found in the input
    #[error("Expected {expected} records in input, found {got}")]
    UnexpectedRecordCount { expected: usize, got: usize },
}

/// Errors that can occur while writing the report
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The report path has no parent directory to stage the temporary file in
    #[error("Report path has no parent directory: {0}")]
    MissingParent(PathBuf),
}
