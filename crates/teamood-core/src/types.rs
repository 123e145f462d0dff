//! Core types for the Tea & Mood tracker

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::TrackerError;

/// Unique identifier for a log record
///
/// Uses ULID so freshly generated ids never collide in practice. The string
/// form is the opaque id exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Ulid);

impl LogId {
    /// Create a new LogId with current timestamp
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Create a LogId from a ULID
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Get the underlying ULID
    pub fn as_ulid(&self) -> &Ulid {
        &self.0
    }

    /// Convert to string representation
    pub fn to_string_repr(&self) -> String {
        self.0.to_string()
    }

    /// Parse from string representation
    pub fn from_string(s: &str) -> Result<Self, TrackerError> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| TrackerError::InvalidLogId(format!("'{}': {}", s, e)))
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the user felt when logging a tea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Happy,
    Tired,
    Stressed,
}

impl Mood {
    /// All moods in display order
    pub const ALL: [Mood; 4] = [Mood::Calm, Mood::Happy, Mood::Tired, Mood::Stressed];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Calm => "Calm",
            Mood::Happy => "Happy",
            Mood::Tired => "Tired",
            Mood::Stressed => "Stressed",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Calm => "🙂",
            Mood::Happy => "😄",
            Mood::Tired => "😴",
            Mood::Stressed => "😣",
        }
    }
}

/// Kind of tea, each with a fixed caffeine estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeaType {
    GreenTea,
    BlackTea,
    Oolong,
    Herbal,
}

impl TeaType {
    /// All tea types in display order
    pub const ALL: [TeaType; 4] = [
        TeaType::GreenTea,
        TeaType::BlackTea,
        TeaType::Oolong,
        TeaType::Herbal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeaType::GreenTea => "Green Tea",
            TeaType::BlackTea => "Black Tea",
            TeaType::Oolong => "Oolong",
            TeaType::Herbal => "Herbal",
        }
    }

    /// Estimated caffeine per cup, in milligrams
    pub fn caffeine_mg(self) -> u32 {
        match self {
            TeaType::GreenTea => 35,
            TeaType::BlackTea => 47,
            TeaType::Oolong => 38,
            TeaType::Herbal => 0,
        }
    }
}

/// Time bucket of the day a tea was drunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// All time buckets in chronological order
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }
}

/// Error returned when parsing one of the tracker enums from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    input: String,
    expected: Vec<&'static str>,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', expected one of: {}",
            self.kind,
            self.input,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}

/// Lowercase the label and drop separators: "Green Tea" and "green-tea" both become "greentea"
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_by_label<T: Copy>(
    kind: &'static str,
    input: &str,
    all: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, ParseEnumError> {
    let wanted = normalize(input);
    all.iter()
        .copied()
        .find(|v| normalize(label(*v)) == wanted)
        .ok_or_else(|| ParseEnumError {
            kind,
            input: input.to_string(),
            expected: all.iter().map(|v| label(*v)).collect(),
        })
}

impl FromStr for Mood {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_label("mood", s, &Mood::ALL, Mood::label)
    }
}

impl FromStr for TeaType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_label("tea type", s, &TeaType::ALL, TeaType::label)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_label("time of day", s, &TimeOfDay::ALL, TimeOfDay::label)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for TeaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single tea-and-mood log
///
/// `caffeine_mg` is copied from the tea type when the record is created and
/// never recomputed, so changing a tea estimate later does not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unique identifier for the log
    pub id: LogId,
    /// Calendar day of the log
    pub date: NaiveDate,
    pub mood: Mood,
    pub tea_type: TeaType,
    pub time_of_day: TimeOfDay,
    /// Caffeine estimate frozen at creation
    pub caffeine_mg: u32,
}

impl LogRecord {
    /// Create a new log with a fresh id and the tea's caffeine estimate
    pub fn new(date: NaiveDate, mood: Mood, tea_type: TeaType, time_of_day: TimeOfDay) -> Self {
        Self {
            id: LogId::new(),
            date,
            mood,
            tea_type,
            time_of_day,
            caffeine_mg: tea_type.caffeine_mg(),
        }
    }

    /// Check that `caffeine_mg` is still the tea type's estimate
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::AmountMismatch` for a record whose amount was
    /// edited after creation (or deserialized with a different value).
    pub fn check_amount(&self) -> Result<(), TrackerError> {
        let expected = self.tea_type.caffeine_mg();
        if self.caffeine_mg != expected {
            return Err(TrackerError::AmountMismatch {
                id: self.id,
                expected,
                actual: self.caffeine_mg,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_log_id_new() {
        let id1 = LogId::new();
        let id2 = LogId::new();
        // Should generate different IDs
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_log_id_string_roundtrip() {
        let id = LogId::new();
        let parsed = LogId::from_string(&id.to_string_repr()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_log_id_rejects_garbage() {
        let err = LogId::from_string("not-a-ulid").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidLogId(_)));
    }

    #[test]
    fn test_record_freezes_caffeine_from_tea() {
        let log = LogRecord::new(date(2024, 3, 1), Mood::Calm, TeaType::BlackTea, TimeOfDay::Morning);
        assert_eq!(log.caffeine_mg, 47);

        let herbal = LogRecord::new(date(2024, 3, 1), Mood::Calm, TeaType::Herbal, TimeOfDay::Evening);
        assert_eq!(herbal.caffeine_mg, 0);
    }

    #[test]
    fn test_tea_weights() {
        let weights: Vec<u32> = TeaType::ALL.iter().map(|t| t.caffeine_mg()).collect();
        assert_eq!(weights, vec![35, 47, 38, 0]);
    }

    #[test]
    fn test_parse_accepts_labels_and_identifiers() {
        assert_eq!("calm".parse::<Mood>().unwrap(), Mood::Calm);
        assert_eq!("Stressed".parse::<Mood>().unwrap(), Mood::Stressed);
        assert_eq!("green-tea".parse::<TeaType>().unwrap(), TeaType::GreenTea);
        assert_eq!("black_tea".parse::<TeaType>().unwrap(), TeaType::BlackTea);
        assert_eq!("Green Tea".parse::<TeaType>().unwrap(), TeaType::GreenTea);
        assert_eq!("EVENING".parse::<TimeOfDay>().unwrap(), TimeOfDay::Evening);
    }

    #[test]
    fn test_parse_error_lists_choices() {
        let err = "sleepy".parse::<Mood>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sleepy"));
        assert!(msg.contains("Calm, Happy, Tired, Stressed"));
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let log = LogRecord::new(date(2024, 3, 1), Mood::Tired, TeaType::Oolong, TimeOfDay::Evening);
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"oolong\""));
        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn test_check_amount_rejects_edited_record() {
        let mut log = LogRecord::new(date(2024, 3, 1), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning);
        assert!(log.check_amount().is_ok());

        log.caffeine_mg = 9999;
        match log.check_amount() {
            Err(TrackerError::AmountMismatch { id, expected, actual }) => {
                assert_eq!(id, log.id);
                assert_eq!(expected, 35);
                assert_eq!(actual, 9999);
            }
            other => panic!("expected AmountMismatch, got {:?}", other),
        }
    }
}
