//! Tea & Mood Tracker Core Library
//!
//! Observable log store and the derived views built from it.
//!
//! ## Overview
//!
//! Users record which tea they drank, when, and how they felt. The core keeps
//! those logs in a [`LogStore`] and derives two read-only views that are
//! rebuilt from scratch on every change:
//!
//! - [`TodayView`]: today's count, caffeine, per-mood and per-bucket counts,
//!   dominant mood, and the trailing 7-day caffeine chart over all logs
//! - [`HistoryView`]: the filtered and sorted log list with counters and a
//!   7-day chart over the *filtered* logs
//!
//! ## Data Flow
//!
//! ```text
//! LogStore::add / remove
//!      │  one immutable Snapshot per committed mutation
//!      ├──────────────────────────┐
//!      ▼                          ▼
//! TodayProjector             HistoryProjector ◄── filter / sort setters
//!      │  aggregate::*            │  aggregate::weekly_series(filtered)
//!      ▼                          ▼
//! TodayView                  HistoryView
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use teamood_core::{AddLogForm, FixedClock, HistoryProjector, LogStore, Mood, TodayProjector};
//!
//! let clock = Arc::new(FixedClock(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
//! let store = LogStore::new();
//! let mut today = TodayProjector::new(&store, clock.clone());
//! let mut history = HistoryProjector::new(store.clone(), clock.clone());
//!
//! let mut form = AddLogForm::new();
//! form.select_mood(Mood::Happy);
//! form.save(&store, clock.as_ref()).unwrap();
//!
//! today.refresh();
//! history.refresh();
//! assert_eq!(today.view().summary.dominant_mood, Some(Mood::Happy));
//! assert_eq!(history.view().total_log_count, 1);
//! ```

pub mod add;
pub mod aggregate;
pub mod clock;
pub mod error;
pub mod history;
pub mod storage;
pub mod store;
pub mod today;
pub mod types;

// Re-exports
pub use add::AddLogForm;
pub use aggregate::{DailyBucket, TodaySummary, WEEK_DAYS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{TrackerError, TrackerResult};
pub use history::{project_history, FilterSelection, HistoryProjector, HistoryView, SortOrder};
pub use storage::Storage;
pub use store::{demo_logs, LogStore, Snapshot, Subscription};
pub use today::{project_today, TodayProjector, TodayView};
pub use types::*;
