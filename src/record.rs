//! Record types for the motorank library
//!
//! A [`Record`] is one input vehicle as read from the JSON file. A
//! [`RankedRecord`] pairs a copy of that record with the rank computed for it
//! at a given year.

use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

/// Number of distance units that add one point of rank
pub const DISTANCE_PER_RANK: f64 = 1000.0;

/// A single vehicle record
///
/// Records are immutable once constructed and are copied into the buffer and
/// the results rather than shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Manufacturer name
    pub manufacturer: String,

    /// Acquisition date (calendar year)
    pub date: i32,

    /// Accumulated distance
    ///
    /// Non-negative by convention; not enforced.
    pub distance: f64,
}
impl Record {
    pub fn new(manufacturer: impl Into<String>, date: i32, distance: f64) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            date,
            distance,
        }
    }

    /// Computes the rank of this record as seen from `current_year`
    ///
    /// The rank is the age of the record in years plus one point for every
    /// full [`DISTANCE_PER_RANK`] of distance. The value depends on the year it
    /// is computed in, so the same record ranks differently on different
    /// calendar years.
    ///
    /// Ranks outside the `i32` range are clamped to its bounds.
    #[must_use]
    pub fn rank_at(&self, current_year: i32) -> i32 {
        let age = i64::from(current_year) - i64::from(self.date);
        // float to int casts saturate (NaN becomes 0)
        let wear = (self.distance / DISTANCE_PER_RANK).floor() as i64;
        let rank = age.saturating_add(wear);
        i32::try_from(rank).unwrap_or(if rank < 0 { i32::MIN } else { i32::MAX })
    }

    /// Ranks this record at `current_year`, producing an owned [`RankedRecord`]
    #[must_use]
    pub fn ranked(self, current_year: i32) -> RankedRecord {
        let rank = self.rank_at(current_year);
        RankedRecord { record: self, rank }
    }
}

/// A record paired with the rank computed for it
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: Record,
    pub rank: i32,
}
impl RankedRecord {
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// Ordering key of the [`SortedAccumulator`](crate::SortedAccumulator)
#[auto_impl(&, Box, Arc)]
pub trait Ranked {
    /// Returns the computed rank
    fn rank(&self) -> i32;

    /// Returns the acquisition year, used to break rank ties
    fn date(&self) -> i32;
}

impl Ranked for RankedRecord {
    fn rank(&self) -> i32 {
        self.rank
    }

    fn date(&self) -> i32 {
        self.record.date
    }
}
