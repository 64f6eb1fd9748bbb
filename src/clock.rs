use chrono::Datelike;

/// Source of the "current year" used when ranking records
///
/// Ranks are point-in-time values. Pipelines read the year once per run from
/// a `YearSource` so that every worker ranks against the same year.
pub trait YearSource: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Reads the year from the local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemYear;
impl YearSource for SystemYear {
    fn current_year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

/// Always reports the same year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedYear(pub i32);
impl YearSource for FixedYear {
    fn current_year(&self) -> i32 {
        self.0
    }
}
