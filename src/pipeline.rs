//! Concurrent ranking pipeline
//!
//! One producer feeds a [`BoundedBuffer`] while a pool of workers drains it,
//! ranking and filtering each record and inserting the survivors into a shared
//! [`SortedAccumulator`]. The producer runs on the calling thread and the
//! workers on scoped threads, all of which are joined before the results are
//! read.

use std::thread;

use tracing::info;

use crate::producer::fill;
use crate::worker::{run_worker, RankFilter, WorkerStats};
use crate::{
    BoundedBuffer, Config, Error, RankedRecord, Record, Result, SortedAccumulator, YearSource,
};

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Year the records were ranked against
    pub current_year: i32,

    /// Records that passed the threshold, in rank order
    pub results: Vec<RankedRecord>,

    /// Counters of every worker, ordered by worker id
    pub workers: Vec<WorkerStats>,
}
impl Outcome {
    /// Total number of records popped by all workers
    #[must_use]
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    config: Config,
}
impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ranks `records` concurrently and returns the ones below the threshold
    ///
    /// The year is read from `clock` once, before any worker starts.
    pub fn run<Y: YearSource + ?Sized>(&self, records: &[Record], clock: &Y) -> Result<Outcome> {
        let filter = RankFilter {
            current_year: clock.current_year(),
            threshold: self.config.threshold,
        };
        let results = SortedAccumulator::with_capacity(records.len());
        let workers = self.drive(records, filter, &results)?;

        let outcome = Outcome {
            current_year: filter.current_year,
            results: results.into_sorted(),
            workers,
        };
        info!(
            records = records.len(),
            accepted = outcome.results.len(),
            workers = outcome.workers.len(),
            year = outcome.current_year,
            "ranked records"
        );
        Ok(outcome)
    }

    /// Runs the producer and the workers until every worker has terminated
    ///
    /// A panicking worker is reported as [`Error::WorkerPanicked`] even if
    /// it also left the producer with an abandoned buffer.
    fn drive(
        &self,
        records: &[Record],
        filter: RankFilter,
        results: &SortedAccumulator<RankedRecord>,
    ) -> Result<Vec<WorkerStats>> {
        let wait = self.config.wait;
        let buffer = BoundedBuffer::new(self.config.capacity)?;

        thread::scope(|s| -> Result<Vec<WorkerStats>> {
            // every consumer is registered before the first push
            let handles: Vec<_> = (0..self.config.workers)
                .map(|id| {
                    let consumer = buffer.consumer();
                    s.spawn(move || run_worker(id, consumer, results, filter, wait))
                })
                .collect();

            let filled = fill(&buffer, records.iter().cloned(), wait);

            // join every handle before inspecting any, so no panic escapes the scope
            let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
            let workers = joined
                .into_iter()
                .enumerate()
                .map(|(id, joined)| joined.map_err(|_| Error::WorkerPanicked(id)))
                .collect::<Result<Vec<_>>>()?;
            filled?;
            Ok(workers)
        })
    }
}

#[cfg(test)]
mod testing {
    use std::sync::mpsc;
    use std::time::Duration;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{FixedYear, Wait};

    fn scenario() -> Vec<Record> {
        vec![
            Record::new("A", 2000, 500.0),
            Record::new("B", 2020, 100.0),
            Record::new("C", 1990, 30_000.0),
        ]
    }

    fn random_fleet(seed: u64, n: usize) -> Vec<Record> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                Record::new(
                    format!("M{i}"),
                    rng.random_range(1985..=2024),
                    rng.random_range(0.0..20_000.0),
                )
            })
            .collect()
    }

    fn key(record: &Record) -> (String, i32, u64) {
        (record.manufacturer.clone(), record.date, record.distance.to_bits())
    }

    #[test]
    fn test_end_to_end_scenario() -> anyhow::Result<()> {
        for wait in [Wait::Block, Wait::Spin] {
            let config = Config::builder()
                .expected_records(3)
                .capacity(1)
                .threshold(26)
                .workers(4)
                .wait(wait)
                .build()?;
            let outcome = Pipeline::new(config)?.run(&scenario(), &FixedYear(2024))?;
            let summary: Vec<_> = outcome
                .results
                .iter()
                .map(|r| (r.record.manufacturer.as_str(), r.rank))
                .collect();
            assert_eq!(summary, vec![("B", 4), ("A", 24)]);
            assert_eq!(outcome.processed(), 3);
            assert_eq!(outcome.current_year, 2024);
        }
        Ok(())
    }

    #[test]
    fn test_tie_break_by_date() -> anyhow::Result<()> {
        // both rank 10 in 2024
        let records = vec![
            Record::new("Older", 2016, 2_000.0),
            Record::new("Newer", 2020, 6_500.0),
        ];
        let config = Config::builder().expected_records(2).capacity(1).build()?;
        let outcome = Pipeline::new(config)?.run(&records, &FixedYear(2024))?;
        let names: Vec<_> = outcome
            .results
            .iter()
            .map(|r| r.record.manufacturer.as_str())
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
        Ok(())
    }

    #[test]
    fn test_nothing_lost_or_duplicated() -> anyhow::Result<()> {
        let records = random_fleet(42, 300);
        for (capacity, workers) in [(1, 1), (3, 5), (150, 16)] {
            let config = Config::builder()
                .expected_records(records.len())
                .capacity(capacity)
                .threshold(i32::MAX)
                .workers(workers)
                .build()?;
            let outcome = Pipeline::new(config)?.run(&records, &FixedYear(2024))?;
            assert_eq!(outcome.workers.len(), workers);
            assert_eq!(outcome.processed(), records.len());

            let mut expected: Vec<_> = records.iter().map(key).collect();
            let mut got: Vec<_> = outcome.results.iter().map(|r| key(&r.record)).collect();
            expected.sort();
            got.sort();
            assert_eq!(got, expected);
        }
        Ok(())
    }

    #[test]
    fn test_filter_partitions_records() -> anyhow::Result<()> {
        let records = random_fleet(7, 120);
        let config = Config::builder()
            .expected_records(records.len())
            .capacity(10)
            .threshold(20)
            .workers(6)
            .wait(Wait::Spin)
            .build()?;
        let outcome = Pipeline::new(config)?.run(&records, &FixedYear(2024))?;

        for ranked in &outcome.results {
            assert!(ranked.rank < 20);
            assert_eq!(ranked.rank, ranked.record.rank_at(2024));
        }
        let rejected = records.iter().filter(|r| r.rank_at(2024) >= 20).count();
        assert_eq!(outcome.results.len() + rejected, records.len());

        let accepted: usize = outcome.workers.iter().map(|w| w.accepted).sum();
        assert_eq!(accepted, outcome.results.len());
        for pair in outcome.results.windows(2) {
            assert!(
                pair[0].rank < pair[1].rank
                    || (pair[0].rank == pair[1].rank && pair[0].record.date >= pair[1].record.date)
            );
        }
        Ok(())
    }

    #[test]
    fn test_worker_panic_is_reported() -> anyhow::Result<()> {
        for (workers, wait) in [(1, Wait::Block), (3, Wait::Block), (2, Wait::Spin)] {
            let config = Config::builder()
                .expected_records(5)
                .capacity(1)
                .threshold(i32::MAX)
                .workers(workers)
                .wait(wait)
                .build()?;
            let pipeline = Pipeline::new(config)?;
            let records = scenario().into_iter().cycle().take(5).collect::<Vec<_>>();
            let filter = RankFilter {
                current_year: 2024,
                threshold: config.threshold,
            };

            // no room for a single accepted record, every worker panics on insert
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let results = SortedAccumulator::with_capacity(0);
                let _ = tx.send(pipeline.drive(&records, filter, &results));
            });
            let driven = rx.recv_timeout(Duration::from_secs(10))?;
            assert!(matches!(driven, Err(Error::WorkerPanicked(_))));
        }
        Ok(())
    }

    #[test]
    fn test_huge_distance_is_rejected() -> anyhow::Result<()> {
        let records: Vec<_> = (0..5)
            .map(|i| Record::new(format!("Big{i}"), 2000, 1e13))
            .collect();
        let config = Config::builder()
            .expected_records(5)
            .capacity(1)
            .workers(1)
            .build()?;
        let outcome = Pipeline::new(config)?.run(&records, &FixedYear(2024))?;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.processed(), 5);
        Ok(())
    }

    #[test]
    fn test_empty_input() -> anyhow::Result<()> {
        let config = Config::builder().expected_records(0).capacity(1).build()?;
        let outcome = Pipeline::new(config)?.run(&[], &FixedYear(2024))?;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.processed(), 0);
        Ok(())
    }
}
