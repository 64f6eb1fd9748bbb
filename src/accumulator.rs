use std::cmp::Ordering;

use parking_lot::Mutex;

use crate::Ranked;

/// Ordering used by the [`SortedAccumulator`]
///
/// Lower ranks come first. Equal ranks are ordered by descending date so that
/// more recently acquired records come first.
pub fn rank_order<T: Ranked>(a: &T, b: &T) -> Ordering {
    a.rank()
        .cmp(&b.rank())
        .then_with(|| b.date().cmp(&a.date()))
}

/// Thread-safe container that keeps ranked items in [`rank_order`]
///
/// Every insertion runs under a single lock. The capacity is a hard bound: it
/// is sized to the total number of inputs, so overflowing it means an item was
/// processed twice.
#[derive(Debug)]
pub struct SortedAccumulator<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
}
impl<T: Ranked> SortedAccumulator<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Inserts an item at its sorted position
    ///
    /// Scans from the back past every item that orders strictly after `item`,
    /// then places it there.
    ///
    /// # Panics
    ///
    /// Panics if the accumulator is already at capacity.
    pub fn insert(&self, item: T) {
        let mut items = self.items.lock();
        assert!(
            items.len() < self.capacity,
            "sorted accumulator overflow (capacity {})",
            self.capacity
        );
        let mut pos = items.len();
        while pos > 0 && rank_order(&items[pos - 1], &item) == Ordering::Greater {
            pos -= 1;
        }
        items.insert(pos, item);
    }

    /// Consumes the accumulator, returning the items in order
    pub fn into_sorted(self) -> Vec<T> {
        self.items.into_inner()
    }
}
impl<T: Ranked + Clone> SortedAccumulator<T> {
    /// Returns a copy of the items in order
    ///
    /// Only meaningful once every inserter has stopped.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().clone()
    }
}

#[cfg(test)]
mod testing {
    use std::thread;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{RankedRecord, Record};

    fn ranked(name: &str, date: i32, rank: i32) -> RankedRecord {
        RankedRecord {
            record: Record::new(name, date, 0.0),
            rank,
        }
    }

    fn assert_ordered(items: &[RankedRecord]) {
        for pair in items.windows(2) {
            assert_ne!(
                rank_order(&pair[0], &pair[1]),
                Ordering::Greater,
                "{:?} placed before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_lowest_rank_first() {
        let acc = SortedAccumulator::with_capacity(3);
        acc.insert(ranked("A", 2000, 24));
        acc.insert(ranked("B", 2020, 4));
        acc.insert(ranked("C", 2010, 14));
        let names: Vec<_> = acc
            .snapshot()
            .into_iter()
            .map(|r| r.record.manufacturer)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_tie_break_later_date_first() {
        let acc = SortedAccumulator::with_capacity(3);
        acc.insert(ranked("old", 2001, 10));
        acc.insert(ranked("new", 2019, 10));
        acc.insert(ranked("mid", 2010, 10));
        let dates: Vec<_> = acc.into_sorted().iter().map(|r| r.record.date).collect();
        assert_eq!(dates, vec![2019, 2010, 2001]);
    }

    #[test]
    fn test_works_through_references() {
        let a = ranked("A", 2000, 2);
        let b = ranked("B", 2000, 1);
        let acc = SortedAccumulator::with_capacity(2);
        acc.insert(&a);
        acc.insert(&b);
        assert_eq!(acc.snapshot(), vec![&b, &a]);
    }

    #[test]
    #[should_panic(expected = "sorted accumulator overflow")]
    fn test_overflow_panics() {
        let acc = SortedAccumulator::with_capacity(1);
        acc.insert(ranked("A", 2000, 1));
        acc.insert(ranked("B", 2000, 2));
    }

    #[test]
    fn test_concurrent_inserts_stay_sorted() {
        let threads = 8;
        let per_thread = 64;
        let acc = SortedAccumulator::with_capacity(threads * per_thread);

        thread::scope(|s| {
            for tid in 0..threads {
                let acc = &acc;
                s.spawn(move || {
                    let mut rng = SmallRng::seed_from_u64(tid as u64);
                    for i in 0..per_thread {
                        let date = rng.random_range(1980..2024);
                        let rank = rng.random_range(0..40);
                        acc.insert(ranked(&format!("{tid}-{i}"), date, rank));
                    }
                });
            }
        });

        let items = acc.into_sorted();
        assert_eq!(items.len(), threads * per_thread);
        assert_ordered(&items);
    }
}
