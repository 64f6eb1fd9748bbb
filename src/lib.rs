//! # motorank
//!
//! Ranks vehicle records concurrently and reports the ones below a threshold.
//!
//! A single producer pushes records into a [`BoundedBuffer`]; a pool of workers
//! pops them, computes a rank per record, and inserts the records ranked below
//! the threshold into a [`SortedAccumulator`]. Once every worker has observed
//! the closed buffer the accumulator holds the final, ordered answer.
//!
//! ```
//! use motorank::{Config, FixedYear, Pipeline, Record};
//!
//! let records = vec![
//!     Record::new("A", 2000, 500.0),
//!     Record::new("B", 2020, 100.0),
//!     Record::new("C", 1990, 30_000.0),
//! ];
//! let config = Config::builder()
//!     .expected_records(records.len())
//!     .capacity(1)
//!     .workers(2)
//!     .build()
//!     .unwrap();
//!
//! let outcome = Pipeline::new(config).unwrap().run(&records, &FixedYear(2024)).unwrap();
//! let ranks: Vec<_> = outcome.results.iter().map(|r| r.rank).collect();
//! assert_eq!(ranks, vec![4, 24]);
//! ```

mod accumulator;
mod buffer;
mod clock;
mod config;
mod error;
mod loader;
mod pipeline;
mod producer;
mod record;
mod report;
mod worker;

pub use accumulator::{rank_order, SortedAccumulator};
pub use buffer::{BoundedBuffer, Consumer, Pop, PushError};
pub use clock::{FixedYear, SystemYear, YearSource};
pub use config::{
    Config, ConfigBuilder, Wait, DEFAULT_CAPACITY, DEFAULT_RECORDS, DEFAULT_THRESHOLD,
    DEFAULT_WORKERS,
};
pub use error::{ConfigError, Error, LoadError, ReportError, Result};
pub use loader::{load_records, read_records};
pub use pipeline::{Outcome, Pipeline};
pub use producer::fill;
pub use record::{Ranked, RankedRecord, Record, DISTANCE_PER_RANK};
pub use report::{render_report, write_report, write_tables};
pub use worker::{run_worker, RankFilter, WorkerStats};
