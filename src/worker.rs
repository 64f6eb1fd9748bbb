use std::thread;

use tracing::debug;

use crate::{Consumer, Pop, RankedRecord, Record, SortedAccumulator, Wait};

/// Per-worker counters reported once the worker terminates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Worker id, unique within a pipeline run
    pub id: usize,

    /// Number of records popped from the buffer
    pub processed: usize,

    /// Number of records inserted into the accumulator
    pub accepted: usize,
}
impl WorkerStats {
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.processed - self.accepted
    }
}

/// Ranking and filtering parameters shared by all workers of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankFilter {
    /// Year every record is ranked against
    pub current_year: i32,

    /// Records are accepted when their rank is strictly below this value
    pub threshold: i32,
}
impl RankFilter {
    /// Ranks `record`, returning it only if it passes the threshold
    #[must_use]
    pub fn apply(&self, record: Record) -> Option<RankedRecord> {
        let ranked = record.ranked(self.current_year);
        (ranked.rank < self.threshold).then_some(ranked)
    }
}

/// Drains the buffer behind `consumer` until it reports [`Pop::Closed`]
///
/// Every popped record is ranked once; records passing `filter` are inserted
/// into `results`. With [`Wait::Spin`] an empty buffer is retried after
/// yielding the thread, with [`Wait::Block`] the worker sleeps on the buffer.
///
/// The consumer handle is dropped when the worker returns or unwinds, so a
/// producer is never left waiting on a buffer nobody drains.
pub fn run_worker(
    id: usize,
    consumer: Consumer<'_, Record>,
    results: &SortedAccumulator<RankedRecord>,
    filter: RankFilter,
    wait: Wait,
) -> WorkerStats {
    let mut stats = WorkerStats {
        id,
        ..WorkerStats::default()
    };

    loop {
        let popped = match wait {
            Wait::Block => consumer.pop(),
            Wait::Spin => consumer.try_pop(),
        };
        match popped {
            Pop::Item(record) => {
                stats.processed += 1;
                if let Some(ranked) = filter.apply(record) {
                    results.insert(ranked);
                    stats.accepted += 1;
                }
            }
            Pop::Empty => thread::yield_now(),
            Pop::Closed => break,
        }
    }

    debug!(
        worker = id,
        processed = stats.processed,
        accepted = stats.accepted,
        "worker finished"
    );
    stats
}
