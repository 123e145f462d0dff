//! Observable in-memory log store
//!
//! `LogStore` owns the ordered collection of logs and is the only place logs
//! are mutated. Every committed mutation publishes a new immutable
//! [`Snapshot`] to every subscriber.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  LogStore (Arc<Mutex<StoreState>>, cheap to clone)              │
//! │  ├── current: Snapshot                                          │
//! │  │   └── version + Arc<[LogRecord]> in insertion order          │
//! │  ├── subscribers: Vec<UnboundedSender<Snapshot>>                │
//! │  │   └── One queue per subscriber, nothing is ever coalesced    │
//! │  └── storage: Option<Storage>                                   │
//! │      └── Written through before the in-memory commit            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutation lock is held while the new snapshot is sent, so all
//! subscribers see snapshots in commit order with no gaps.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{Days, NaiveDate};
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{TrackerError, TrackerResult};
use crate::storage::Storage;
use crate::types::{LogId, LogRecord, Mood, TeaType, TimeOfDay};

/// Immutable view of every stored log at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    logs: Arc<[LogRecord]>,
}

impl Snapshot {
    fn new(version: u64, logs: Vec<LogRecord>) -> Self {
        Self {
            version,
            logs: logs.into(),
        }
    }

    /// 0 for the starting collection, incremented by every committed mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Logs in insertion order
    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

struct StoreState {
    current: Snapshot,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
    storage: Option<Storage>,
}

impl StoreState {
    fn contains(&self, id: &LogId) -> bool {
        self.current.logs.iter().any(|log| log.id == *id)
    }

    /// Replace the current snapshot and deliver it, pruning closed subscriptions
    fn commit(&mut self, logs: Vec<LogRecord>) {
        let snapshot = Snapshot::new(self.current.version + 1, logs);
        self.current = snapshot.clone();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

/// Ordered, observable collection of tea logs
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use teamood_core::{LogRecord, LogStore, Mood, TeaType, TimeOfDay};
///
/// let store = LogStore::new();
/// let mut changes = store.observe();
/// assert_eq!(changes.try_recv().unwrap().len(), 0);
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// store.add(LogRecord::new(today, Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning)).unwrap();
/// assert_eq!(changes.try_recv().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct LogStore {
    state: Arc<Mutex<StoreState>>,
}

impl LogStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), None)
    }

    /// Create an in-memory store pre-seeded with `logs` in the given order
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DuplicateId` if two seed logs share an id, or
    /// `TrackerError::AmountMismatch` if a seed log's amount was edited.
    pub fn with_seed(logs: Vec<LogRecord>) -> TrackerResult<Self> {
        validate_initial(&logs)?;
        Ok(Self::from_parts(logs, None))
    }

    /// Create a store backed by `storage`, starting from its persisted logs
    ///
    /// Every later mutation is written to storage before it is committed in
    /// memory; if the write fails the store is left unchanged. Persisted logs
    /// are validated like seed logs.
    pub fn open(storage: Storage) -> TrackerResult<Self> {
        let logs = storage.load_logs()?;
        validate_initial(&logs)?;
        info!(count = logs.len(), "Loaded logs from storage");
        Ok(Self::from_parts(logs, Some(storage)))
    }

    fn from_parts(logs: Vec<LogRecord>, storage: Option<Storage>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                current: Snapshot::new(0, logs),
                subscribers: Vec::new(),
                storage,
            })),
        }
    }

    /// Subscribe to snapshots
    ///
    /// The subscription immediately holds the current snapshot, followed by one
    /// snapshot per mutation committed after this call.
    pub fn observe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        // Receiver is alive, so this cannot fail
        let _ = tx.send(state.current.clone());
        state.subscribers.push(tx);
        debug!(subscribers = state.subscribers.len(), "New store subscription");
        Subscription { rx }
    }

    /// Current snapshot, without subscribing
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().current.clone()
    }

    /// Append a log
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DuplicateId` if a log with the same id exists,
    /// `TrackerError::AmountMismatch` if its amount is not its tea type's
    /// estimate, or a storage error if the write-through fails. Nothing is
    /// emitted on error.
    pub fn add(&self, log: LogRecord) -> TrackerResult<()> {
        if let Err(e) = log.check_amount() {
            error!(id = %log.id, error = %e, "Refusing to add log with edited amount");
            return Err(e);
        }
        let mut state = self.state.lock();
        if state.contains(&log.id) {
            error!(id = %log.id, "Refusing to add log with duplicate id");
            return Err(TrackerError::DuplicateId(log.id));
        }
        if let Some(storage) = &state.storage {
            storage.append_log(&log)?;
        }

        let id = log.id;
        let mut logs = state.current.logs.to_vec();
        logs.push(log);
        state.commit(logs);
        debug!(%id, version = state.current.version, "Added log");
        Ok(())
    }

    /// Remove the log with this id
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::LogNotFound` if no such log exists. Nothing is
    /// emitted in that case.
    pub fn remove(&self, id: &LogId) -> TrackerResult<()> {
        let mut state = self.state.lock();
        if !state.contains(id) {
            debug!(%id, "Log to remove not found");
            return Err(TrackerError::LogNotFound(*id));
        }
        if let Some(storage) = &state.storage {
            if !storage.remove_log(id)? {
                warn!(%id, "Log was in memory but not in storage");
            }
        }

        let logs = state
            .current
            .logs
            .iter()
            .filter(|log| log.id != *id)
            .cloned()
            .collect();
        state.commit(logs);
        debug!(%id, version = state.current.version, "Removed log");
        Ok(())
    }

    /// Logs dated `date`, in store order
    pub fn by_date(&self, date: NaiveDate) -> Vec<LogRecord> {
        let state = self.state.lock();
        state
            .current
            .logs
            .iter()
            .filter(|log| log.date == date)
            .cloned()
            .collect()
    }

    /// Look up a single log
    pub fn get(&self, id: &LogId) -> Option<LogRecord> {
        let state = self.state.lock();
        state.current.logs.iter().find(|log| log.id == *id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().current.is_empty()
    }

    /// Number of live subscriptions (closed ones are pruned on the next emission)
    pub fn subscriber_count(&self) -> usize {
        let state = self.state.lock();
        state.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_initial(logs: &[LogRecord]) -> TrackerResult<()> {
    let mut seen = HashSet::with_capacity(logs.len());
    for log in logs {
        if let Err(e) = log.check_amount() {
            error!(id = %log.id, error = %e, "Edited amount in initial logs");
            return Err(e);
        }
        if !seen.insert(log.id) {
            error!(id = %log.id, "Duplicate id in initial logs");
            return Err(TrackerError::DuplicateId(log.id));
        }
    }
    Ok(())
}

/// Three sample logs over the last three days, used to populate a fresh store
pub fn demo_logs(today: NaiveDate) -> Vec<LogRecord> {
    vec![
        LogRecord::new(today, Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
        LogRecord::new(
            today - Days::new(1),
            Mood::Happy,
            TeaType::BlackTea,
            TimeOfDay::Afternoon,
        ),
        LogRecord::new(
            today - Days::new(2),
            Mood::Tired,
            TeaType::Oolong,
            TimeOfDay::Evening,
        ),
    ]
}

/// Receiving side of [`LogStore::observe`]
///
/// Yields `None` once every handle to the store has been dropped and the
/// queue is drained.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Next queued snapshot, if any, without waiting
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next snapshot
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        self.rx.poll_recv(cx)
    }
}
