//! Persistent storage for tea logs using redb.
//!
//! The in-memory [`LogStore`](crate::store::LogStore) is the source of truth
//! while the process runs; this backend only makes its contents survive a
//! restart. Rows are keyed by an insertion sequence number so that loading
//! reproduces the original store order, with a secondary id index for
//! delete-by-id.

use crate::error::TrackerError;
use crate::types::{LogId, LogRecord};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// Table definitions
const LOGS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("logs");
const LOG_INDEX_TABLE: TableDefinition<&str, u64> = TableDefinition::new("log_index");

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    pub fn new(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LOGS_TABLE)?;
            let _ = write_txn.open_table(LOG_INDEX_TABLE)?;
        }
        write_txn.commit()?;

        debug!(path = %path.display(), "Opened log storage");

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Append a log after every stored log.
    ///
    /// Fails with `DuplicateId` if a log with the same id is already stored.
    pub fn append_log(&self, log: &LogRecord) -> Result<(), TrackerError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut logs = write_txn.open_table(LOGS_TABLE)?;
            let mut index = write_txn.open_table(LOG_INDEX_TABLE)?;
            let key = log.id.to_string_repr();

            if index.get(key.as_str())?.is_some() {
                return Err(TrackerError::DuplicateId(log.id));
            }

            let seq = match logs.last()? {
                Some((last, _)) => last.value() + 1,
                None => 0,
            };
            let data =
                serde_json::to_vec(log).map_err(|e| TrackerError::Serialization(e.to_string()))?;

            logs.insert(seq, data.as_slice())?;
            index.insert(key.as_str(), seq)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove a log by id.
    ///
    /// Returns `false` if no such log was stored.
    pub fn remove_log(&self, id: &LogId) -> Result<bool, TrackerError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        let removed = {
            let mut logs = write_txn.open_table(LOGS_TABLE)?;
            let mut index = write_txn.open_table(LOG_INDEX_TABLE)?;
            let key = id.to_string_repr();

            let seq = index.remove(key.as_str())?.map(|guard| guard.value());
            match seq {
                Some(seq) => {
                    logs.remove(seq)?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Check whether a log with this id is stored.
    pub fn contains_log(&self, id: &LogId) -> Result<bool, TrackerError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let index = read_txn.open_table(LOG_INDEX_TABLE)?;
        let key = id.to_string_repr();
        Ok(index.get(key.as_str())?.is_some())
    }

    /// Load all logs in insertion order.
    pub fn load_logs(&self) -> Result<Vec<LogRecord>, TrackerError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(LOGS_TABLE)?;

        let mut logs = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let log: LogRecord = serde_json::from_slice(value.value())
                .map_err(|e| TrackerError::Serialization(e.to_string()))?;
            logs.push(log);
        }
        Ok(logs)
    }
}
