//! Source of the reference date for "today" and the trailing week

use chrono::{Local, NaiveDate};

/// Supplies the current calendar date
///
/// Projectors read the clock every time they recompute, so a view built just
/// after midnight uses the new day even if the snapshot did not change.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
