use crate::{ConfigError, Result};

/// Number of records expected in one input file
pub const DEFAULT_RECORDS: usize = 30;

/// Buffer capacity, half of the expected records
pub const DEFAULT_CAPACITY: usize = DEFAULT_RECORDS / 2;

/// Records are kept when their rank is strictly below this value
pub const DEFAULT_THRESHOLD: i32 = 26;

/// Number of worker threads
pub const DEFAULT_WORKERS: usize = 10;

/// How producers and workers wait on the bounded buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wait {
    /// Block on the buffer's condition variables
    #[default]
    Block,
    /// Retry non-blocking calls, yielding the thread between attempts
    Spin,
}

/// Validated pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of records the input must contain
    pub expected_records: usize,

    /// Capacity of the bounded buffer
    pub capacity: usize,

    /// Rank threshold (exclusive)
    pub threshold: i32,

    /// Number of worker threads (resolved, never zero)
    pub workers: usize,

    /// Waiting strategy of producer and workers
    pub wait: Wait,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            expected_records: DEFAULT_RECORDS,
            capacity: DEFAULT_CAPACITY,
            threshold: DEFAULT_THRESHOLD,
            workers: DEFAULT_WORKERS,
            wait: Wait::default(),
        }
    }
}
impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks the invariants a pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity.into());
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers.into());
        }
        if self.expected_records > 0 && self.capacity > self.expected_records {
            return Err(ConfigError::CapacityExceedsRecords {
                capacity: self.capacity,
                records: self.expected_records,
            }
            .into());
        }
        Ok(())
    }
}

/// Builder for [`Config`]
///
/// Unset fields fall back to the defaults. A worker count of zero resolves to
/// the number of logical CPUs.
///
/// ```
/// use motorank::{Config, Wait};
///
/// let config = Config::builder()
///     .expected_records(3)
///     .capacity(1)
///     .workers(2)
///     .wait(Wait::Spin)
///     .build()
///     .unwrap();
/// assert_eq!(config.threshold, 26);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder {
    expected_records: Option<usize>,
    capacity: Option<usize>,
    threshold: Option<i32>,
    workers: Option<usize>,
    wait: Option<Wait>,
}
impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn expected_records(mut self, expected_records: usize) -> Self {
        self.expected_records = Some(expected_records);
        self
    }
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
    #[must_use]
    pub fn threshold(mut self, threshold: i32) -> Self {
        self.threshold = Some(threshold);
        self
    }
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    #[must_use]
    pub fn wait(mut self, wait: Wait) -> Self {
        self.wait = Some(wait);
        self
    }

    pub fn build(self) -> Result<Config> {
        let expected_records = self.expected_records.unwrap_or(DEFAULT_RECORDS);
        let capacity = self
            .capacity
            .unwrap_or_else(|| (expected_records / 2).max(1));
        let workers = match self.workers.unwrap_or(DEFAULT_WORKERS) {
            0 => num_cpus::get(),
            n => n,
        };
        let config = Config {
            expected_records,
            capacity,
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
            workers,
            wait: self.wait.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::Pipeline;

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = ConfigBuilder::new().build()?;
        assert_eq!(config, Config::default());
        assert_eq!(config.capacity, 15);
        Ok(())
    }

    #[test]
    fn test_capacity_follows_records() -> anyhow::Result<()> {
        let config = Config::builder().expected_records(8).build()?;
        assert_eq!(config.capacity, 4);
        let config = Config::builder().expected_records(1).build()?;
        assert_eq!(config.capacity, 1);
        Ok(())
    }

    #[test]
    fn test_zero_workers_uses_cpus() -> anyhow::Result<()> {
        let config = Config::builder().workers(0).build()?;
        assert_eq!(config.workers, num_cpus::get());
        Ok(())
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Config::builder().capacity(0).build().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::ConfigError(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_unresolved_zero_workers_rejected() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(crate::Error::ConfigError(ConfigError::ZeroWorkers))
        ));
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let err = Config::builder()
            .expected_records(4)
            .capacity(5)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::ConfigError(ConfigError::CapacityExceedsRecords {
                capacity: 5,
                records: 4
            })
        ));
    }
}
