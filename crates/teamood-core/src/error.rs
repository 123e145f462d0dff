//! Error types for the Tea & Mood tracker

use thiserror::Error;

use crate::types::LogId;

/// Main error type for tracker operations
///
/// Empty stores and filters that match nothing are valid states, not errors.
/// Aggregation and projection never fail; only store mutations and the
/// persistence backend produce these.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A log with this id is already in the store (id generation bug)
    #[error("Duplicate log id: {0}")]
    DuplicateId(LogId),

    /// No log with this id is in the store
    #[error("Log not found: {0}")]
    LogNotFound(LogId),

    /// A log's caffeine amount differs from its tea type's estimate
    #[error("Log {id} records {actual} mg but its tea type is {expected} mg")]
    AmountMismatch { id: LogId, expected: u32, actual: u32 },

    /// A string could not be parsed as a log id
    #[error("Invalid log id: {0}")]
    InvalidLogId(String),

    /// Error during storage operations (redb)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Error during serialization/deserialization of a stored log
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using TrackerError
pub type TrackerResult<T> = Result<T, TrackerError>;
