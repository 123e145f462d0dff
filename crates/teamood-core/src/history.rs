//! Filtered, sorted history of logs with its own weekly chart
//!
//! [`HistoryProjector`] keeps the user's filter and sort selection and the
//! latest store snapshot. Any change to either one rebuilds the whole
//! [`HistoryView`] synchronously; nothing is patched incrementally.
//!
//! The weekly chart in the view is built from the *filtered* logs, so a mood
//! filter narrows the list and the chart together. The today screen uses the
//! unfiltered logs instead (see [`crate::today`]).

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{self, DailyBucket, WEEK_DAYS};
use crate::clock::Clock;
use crate::error::TrackerResult;
use crate::store::{LogStore, Snapshot, Subscription};
use crate::types::{LogId, LogRecord, Mood, TimeOfDay};

/// Order of the history list by log date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
        }
    }
}

/// Active history filters plus sort order
///
/// Unset filters let every log through; set filters are AND-combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub today_only: bool,
    pub mood: Option<Mood>,
    pub time_of_day: Option<TimeOfDay>,
    pub sort_order: SortOrder,
}

impl FilterSelection {
    /// Whether `log` passes every active filter
    pub fn matches(&self, log: &LogRecord, today: NaiveDate) -> bool {
        let today_ok = !self.today_only || log.date == today;
        let mood_ok = self.mood.map_or(true, |mood| mood == log.mood);
        let time_ok = self.time_of_day.map_or(true, |time| time == log.time_of_day);
        today_ok && mood_ok && time_ok
    }

    /// True if any filter (not the sort order) is set
    pub fn has_active_filters(&self) -> bool {
        self.today_only || self.mood.is_some() || self.time_of_day.is_some()
    }
}

/// Everything the history screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    /// Filtered logs in display order
    pub logs: Vec<LogRecord>,
    pub filtered_count: usize,
    /// Number of logs in the store, ignoring filters
    pub total_log_count: usize,
    pub filtered_total_mg: u32,
    /// Trailing week built from the filtered logs
    pub weekly: [DailyBucket; WEEK_DAYS],
    pub selection: FilterSelection,
    /// Log currently being deleted, if any
    pub deleting_log_id: Option<LogId>,
    /// Version of the store snapshot this view was built from
    pub snapshot_version: u64,
}

impl HistoryView {
    /// No logs exist at all ("no logs yet")
    pub fn is_empty_store(&self) -> bool {
        self.total_log_count == 0
    }

    /// Logs exist but none pass the filters ("no matching logs")
    pub fn has_no_matches(&self) -> bool {
        self.filtered_count == 0 && self.total_log_count > 0
    }
}

/// Build a history view from a snapshot and a selection
///
/// Sorting is stable: logs sharing a date keep their insertion order in both
/// directions.
pub fn project_history(
    snapshot: &Snapshot,
    selection: &FilterSelection,
    today: NaiveDate,
) -> HistoryView {
    let mut logs: Vec<LogRecord> = snapshot
        .logs()
        .iter()
        .filter(|log| selection.matches(log, today))
        .cloned()
        .collect();

    match selection.sort_order {
        SortOrder::Newest => logs.sort_by(|a, b| b.date.cmp(&a.date)),
        SortOrder::Oldest => logs.sort_by(|a, b| a.date.cmp(&b.date)),
    }

    HistoryView {
        filtered_count: logs.len(),
        total_log_count: snapshot.len(),
        filtered_total_mg: logs.iter().map(|log| log.caffeine_mg).sum(),
        weekly: aggregate::weekly_series(&logs, today),
        selection: *selection,
        deleting_log_id: None,
        snapshot_version: snapshot.version(),
        logs,
    }
}

/// Stateful history screen model
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use teamood_core::{demo_logs, FixedClock, HistoryProjector, LogStore, Mood};
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let store = LogStore::with_seed(demo_logs(today)).unwrap();
/// let mut history = HistoryProjector::new(store, Arc::new(FixedClock(today)));
///
/// history.set_mood_filter(Some(Mood::Stressed));
/// assert!(history.view().has_no_matches());
///
/// history.clear_filters();
/// assert_eq!(history.view().filtered_count, 3);
/// ```
pub struct HistoryProjector {
    store: LogStore,
    changes: Subscription,
    clock: Arc<dyn Clock>,
    selection: FilterSelection,
    snapshot: Snapshot,
    deleting: Option<LogId>,
    view: HistoryView,
}

impl HistoryProjector {
    /// Subscribe to `store` and build the first view from its current logs
    pub fn new(store: LogStore, clock: Arc<dyn Clock>) -> Self {
        let mut changes = store.observe();
        let snapshot = changes.try_recv().unwrap_or_else(|| store.snapshot());
        let selection = FilterSelection::default();
        let view = project_history(&snapshot, &selection, clock.today());
        Self {
            store,
            changes,
            clock,
            selection,
            snapshot,
            deleting: None,
            view,
        }
    }

    /// Current view
    pub fn view(&self) -> &HistoryView {
        &self.view
    }

    /// Current filter and sort selection
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Apply every snapshot queued since the last call, one rebuild each
    ///
    /// Returns how many snapshots were applied.
    pub fn refresh(&mut self) -> usize {
        let mut applied = 0;
        while let Some(snapshot) = self.changes.try_recv() {
            self.apply(snapshot);
            applied += 1;
        }
        applied
    }

    /// Wait for the next snapshot and apply it
    ///
    /// The projector keeps its own store handle, so this only returns `false`
    /// if the subscription was closed underneath it.
    pub async fn changed(&mut self) -> bool {
        match self.changes.recv().await {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn set_today_only(&mut self, today_only: bool) {
        self.selection.today_only = today_only;
        self.recompute();
    }

    pub fn set_mood_filter(&mut self, mood: Option<Mood>) {
        self.selection.mood = mood;
        self.recompute();
    }

    pub fn set_time_filter(&mut self, time_of_day: Option<TimeOfDay>) {
        self.selection.time_of_day = time_of_day;
        self.recompute();
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.selection.sort_order = sort_order;
        self.recompute();
    }

    /// Reset every filter; the sort order is kept
    pub fn clear_filters(&mut self) {
        self.selection = FilterSelection {
            sort_order: self.selection.sort_order,
            ..FilterSelection::default()
        };
        self.recompute();
    }

    /// Whether a delete of `id` is in progress
    pub fn is_deleting(&self, id: &LogId) -> bool {
        self.deleting == Some(*id)
    }

    /// Delete a log from the store and apply the resulting snapshot
    ///
    /// # Errors
    ///
    /// Propagates `TrackerError::LogNotFound` and storage errors from
    /// [`LogStore::remove`]; the view is left as it was.
    pub fn delete_log(&mut self, id: &LogId) -> TrackerResult<()> {
        self.deleting = Some(*id);
        self.view.deleting_log_id = self.deleting;

        let result = self.store.remove(id);

        self.deleting = None;
        self.view.deleting_log_id = None;
        if let Err(e) = &result {
            warn!(%id, error = %e, "Failed to delete log");
        }
        self.refresh();
        result
    }

    fn apply(&mut self, snapshot: Snapshot) {
        debug!(version = snapshot.version(), "History received snapshot");
        self.snapshot = snapshot;
        self.recompute();
    }

    fn recompute(&mut self) {
        let mut view = project_history(&self.snapshot, &self.selection, self.clock.today());
        view.deleting_log_id = self.deleting;
        self.view = view;
    }
}
