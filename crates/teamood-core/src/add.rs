//! Form state for composing a new log

use serde::Serialize;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::TrackerResult;
use crate::store::LogStore;
use crate::types::{LogId, LogRecord, Mood, TeaType, TimeOfDay};

/// Selections for the next log plus a one-shot "saved" flag
///
/// A form saves at most once until [`consume_saved_event`](Self::consume_saved_event)
/// is called, so a double submit cannot create two logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddLogForm {
    pub mood: Mood,
    pub tea_type: TeaType,
    pub time_of_day: TimeOfDay,
    pub is_saving: bool,
    pub is_saved: bool,
}

impl Default for AddLogForm {
    fn default() -> Self {
        Self {
            mood: Mood::Calm,
            tea_type: TeaType::GreenTea,
            time_of_day: TimeOfDay::Morning,
            is_saving: false,
            is_saved: false,
        }
    }
}

impl AddLogForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    pub fn select_tea(&mut self, tea_type: TeaType) {
        self.tea_type = tea_type;
    }

    pub fn select_time_of_day(&mut self, time_of_day: TimeOfDay) {
        self.time_of_day = time_of_day;
    }

    /// Caffeine the current selection would record
    pub fn caffeine_preview_mg(&self) -> u32 {
        self.tea_type.caffeine_mg()
    }

    /// Add a log dated today with the current selections
    ///
    /// Returns `Ok(None)` without touching the store if a save is already in
    /// progress or was already completed.
    ///
    /// # Errors
    ///
    /// Propagates store errors; the form is then ready to retry.
    pub fn save(&mut self, store: &LogStore, clock: &dyn Clock) -> TrackerResult<Option<LogId>> {
        if self.is_saving || self.is_saved {
            debug!("Ignoring save while a previous save is pending");
            return Ok(None);
        }
        self.is_saving = true;

        let log = LogRecord::new(clock.today(), self.mood, self.tea_type, self.time_of_day);
        let id = log.id;
        let result = store.add(log);

        self.is_saving = false;
        result?;
        self.is_saved = true;
        info!(%id, mood = %self.mood, tea = %self.tea_type, "Saved new log");
        Ok(Some(id))
    }

    /// Acknowledge a completed save so the form can be used again
    pub fn consume_saved_event(&mut self) {
        self.is_saved = false;
        self.is_saving = false;
    }
}
