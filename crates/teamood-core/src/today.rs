//! Today screen: today's metrics plus the unfiltered trailing week

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{self, DailyBucket, TodaySummary, WEEK_DAYS};
use crate::clock::Clock;
use crate::store::{LogStore, Snapshot, Subscription};
use crate::types::LogRecord;

/// Everything the today screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayView {
    pub date: NaiveDate,
    /// Logs dated today, in store order
    pub logs: Vec<LogRecord>,
    pub summary: TodaySummary,
    /// Trailing week over every log in the store
    pub weekly: [DailyBucket; WEEK_DAYS],
    pub weekly_total_mg: u32,
    /// `weekly_total_mg / 7`, truncated
    pub weekly_average_mg: u32,
    /// Version of the store snapshot this view was built from
    pub snapshot_version: u64,
}

/// Build a today view from the full, unfiltered snapshot
pub fn project_today(snapshot: &Snapshot, today: NaiveDate) -> TodayView {
    let logs = snapshot.logs();

    TodayView {
        date: today,
        logs: aggregate::logs_on(logs, today),
        summary: aggregate::today_summary(logs, today),
        weekly: aggregate::weekly_series(logs, today),
        weekly_total_mg: aggregate::weekly_total(logs, today),
        weekly_average_mg: aggregate::weekly_average(logs, today),
        snapshot_version: snapshot.version(),
    }
}

/// Keeps a [`TodayView`] in step with the store
///
/// Holds no state of its own beyond the latest view: each snapshot replaces
/// the view wholesale, with `today` read from the clock at that moment.
pub struct TodayProjector {
    changes: Subscription,
    clock: Arc<dyn Clock>,
    view: TodayView,
}

impl TodayProjector {
    /// Subscribe to `store` and build the first view from its current logs
    pub fn new(store: &LogStore, clock: Arc<dyn Clock>) -> Self {
        let mut changes = store.observe();
        let snapshot = changes.try_recv().unwrap_or_else(|| store.snapshot());
        let view = project_today(&snapshot, clock.today());
        Self {
            changes,
            clock,
            view,
        }
    }

    pub fn view(&self) -> &TodayView {
        &self.view
    }

    /// Apply every queued snapshot, one rebuild each
    ///
    /// Returns how many snapshots were applied.
    pub fn refresh(&mut self) -> usize {
        let mut applied = 0;
        while let Some(snapshot) = self.changes.try_recv() {
            self.apply(&snapshot);
            applied += 1;
        }
        applied
    }

    /// Wait for the next snapshot and apply it
    ///
    /// Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        match self.changes.recv().await {
            Some(snapshot) => {
                self.apply(&snapshot);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, snapshot: &Snapshot) {
        debug!(version = snapshot.version(), "Today received snapshot");
        self.view = project_today(snapshot, self.clock.today());
    }
}
