//! Pure reductions over a list of logs
//!
//! Everything here is a function of `(logs, today)` only: no clock reads, no
//! shared state, no failure cases. Logs are expected in store (insertion)
//! order; the only function that depends on that order is
//! [`today_summary`], through its dominant-mood rule.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{LogRecord, Mood, TeaType, TimeOfDay};

/// Number of days in the trailing window, today included
pub const WEEK_DAYS: usize = 7;

/// Caffeine total for one calendar day of the trailing week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub total_mg: u32,
}

/// First day of the window ending at `today`
///
/// Clamped to `NaiveDate::MIN`: within six days of it the window starts at
/// the earliest date instead, still seven buckets long.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WEEK_DAYS as u64 - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Per-day caffeine totals for `today - 6 ..= today`, oldest first
///
/// Always exactly seven buckets; days without logs have a total of 0 and logs
/// outside the window are ignored.
pub fn weekly_series(logs: &[LogRecord], today: NaiveDate) -> [DailyBucket; WEEK_DAYS] {
    let start = week_start(today);
    let mut buckets: [DailyBucket; WEEK_DAYS] = std::array::from_fn(|i| DailyBucket {
        date: start + Days::new(i as u64),
        total_mg: 0,
    });

    for log in logs {
        if log.date < start || log.date > today {
            continue;
        }
        let offset = (log.date - start).num_days() as usize;
        buckets[offset].total_mg += log.caffeine_mg;
    }
    buckets
}

/// Sum of [`weekly_series`]
pub fn weekly_total(logs: &[LogRecord], today: NaiveDate) -> u32 {
    weekly_series(logs, today).iter().map(|b| b.total_mg).sum()
}

/// Daily average over the week, truncated: a total of 10 averages to 1
pub fn weekly_average(logs: &[LogRecord], today: NaiveDate) -> u32 {
    average_of(weekly_total(logs, today))
}

/// Truncating per-day average of a weekly total
pub fn average_of(weekly_total_mg: u32) -> u32 {
    weekly_total_mg / WEEK_DAYS as u32
}

/// Logs dated `date`, in store order
pub fn logs_on(logs: &[LogRecord], date: NaiveDate) -> Vec<LogRecord> {
    logs.iter().filter(|log| log.date == date).cloned().collect()
}

/// Metrics over the logs dated today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub count: usize,
    pub total_mg: u32,
    /// Every mood, zero when absent
    pub mood_counts: BTreeMap<Mood, usize>,
    /// Every tea type, zero when absent
    pub tea_counts: BTreeMap<TeaType, usize>,
    /// Every time bucket, zero when absent
    pub time_of_day_counts: BTreeMap<TimeOfDay, usize>,
    /// Tea of each of today's logs, in store order
    pub teas: Vec<TeaType>,
    /// Mood of the most recently inserted log dated today
    ///
    /// Last one wins, not the most frequent mood:
    /// logs inserted Calm, Calm, Happy give Happy.
    pub dominant_mood: Option<Mood>,
}

/// Summarize the logs dated `today`
pub fn today_summary(logs: &[LogRecord], today: NaiveDate) -> TodaySummary {
    let todays: Vec<&LogRecord> = logs.iter().filter(|log| log.date == today).collect();

    TodaySummary {
        count: todays.len(),
        total_mg: todays.iter().map(|log| log.caffeine_mg).sum(),
        mood_counts: count_by(&todays, &Mood::ALL, |log| log.mood),
        tea_counts: count_by(&todays, &TeaType::ALL, |log| log.tea_type),
        time_of_day_counts: count_by(&todays, &TimeOfDay::ALL, |log| log.time_of_day),
        teas: todays.iter().map(|log| log.tea_type).collect(),
        dominant_mood: todays.last().map(|log| log.mood),
    }
}

fn count_by<K: Ord + Copy>(
    logs: &[&LogRecord],
    keys: &[K],
    key_of: impl Fn(&LogRecord) -> K,
) -> BTreeMap<K, usize> {
    let mut counts: BTreeMap<K, usize> = keys.iter().map(|k| (*k, 0)).collect();
    for log in logs.iter().copied() {
        if let Some(count) = counts.get_mut(&key_of(log)) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    fn log(date: NaiveDate, mood: Mood, tea: TeaType, time: TimeOfDay) -> LogRecord {
        LogRecord::new(date, mood, tea, time)
    }

    #[test]
    fn test_series_is_dense_and_ascending() {
        let series = weekly_series(&[], today());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, days_ago(6));
        assert_eq!(series[6].date, today());
        for pair in series.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
        assert!(series.iter().all(|b| b.total_mg == 0));
    }

    #[test]
    fn test_series_crosses_month_and_leap_day() {
        // 2024-03-02 window reaches back through Feb 29
        let series = weekly_series(&[], today());
        let dates: Vec<String> = series.iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates[0], "2024-02-25");
        assert_eq!(dates[4], "2024-02-29");
        assert_eq!(dates[5], "2024-03-01");
    }

    #[test]
    fn test_series_ignores_logs_outside_window() {
        let logs = vec![
            log(days_ago(7), Mood::Calm, TeaType::BlackTea, TimeOfDay::Morning),
            log(today() + Days::new(1), Mood::Calm, TeaType::BlackTea, TimeOfDay::Morning),
            log(days_ago(6), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
        ];
        let series = weekly_series(&logs, today());
        assert_eq!(series[0].total_mg, 35);
        assert_eq!(weekly_total(&logs, today()), 35);
    }

    #[test]
    fn test_series_sums_same_day() {
        let logs = vec![
            log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(today(), Mood::Happy, TeaType::BlackTea, TimeOfDay::Evening),
        ];
        assert_eq!(weekly_series(&logs, today())[6].total_mg, 82);
    }

    #[test]
    fn test_demo_week_totals() {
        let logs = vec![
            log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(days_ago(1), Mood::Happy, TeaType::BlackTea, TimeOfDay::Afternoon),
            log(days_ago(2), Mood::Tired, TeaType::Oolong, TimeOfDay::Evening),
        ];
        assert_eq!(weekly_total(&logs, today()), 120);
        assert_eq!(weekly_average(&logs, today()), 17);
        assert_eq!(weekly_series(&logs, today())[6].total_mg, 35);
    }

    #[test]
    fn test_average_truncates() {
        // 47 + 38 = 85 mg over the week averages to 12, not 12.14
        let logs = vec![
            log(today(), Mood::Calm, TeaType::BlackTea, TimeOfDay::Morning),
            log(days_ago(3), Mood::Happy, TeaType::Oolong, TimeOfDay::Evening),
            log(days_ago(1), Mood::Tired, TeaType::Herbal, TimeOfDay::Evening),
        ];
        assert_eq!(weekly_total(&logs, today()), 85);
        assert_eq!(weekly_average(&logs, today()), 12);

        // A single black tea: 47 / 7 = 6.71 truncates to 6
        assert_eq!(weekly_average(&logs[..1], today()), 6);

        assert_eq!(average_of(10), 1);
        assert_eq!(average_of(6), 0);
    }

    #[test]
    fn test_empty_today_summary() {
        let logs = vec![log(days_ago(1), Mood::Happy, TeaType::BlackTea, TimeOfDay::Morning)];
        let summary = today_summary(&logs, today());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_mg, 0);
        assert_eq!(summary.dominant_mood, None);
        assert!(summary.teas.is_empty());
        assert_eq!(summary.mood_counts.len(), 4);
        assert!(summary.mood_counts.values().all(|c| *c == 0));
        assert_eq!(summary.time_of_day_counts.len(), 3);
    }

    #[test]
    fn test_dominant_mood_is_last_inserted_not_most_frequent() {
        let logs = vec![
            log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(today(), Mood::Happy, TeaType::Oolong, TimeOfDay::Evening),
            // A later insertion on another day does not count
            log(days_ago(1), Mood::Stressed, TeaType::BlackTea, TimeOfDay::Evening),
        ];
        let summary = today_summary(&logs, today());
        assert_eq!(summary.dominant_mood, Some(Mood::Happy));
        assert_eq!(summary.mood_counts[&Mood::Calm], 2);
        assert_eq!(summary.mood_counts[&Mood::Happy], 1);
        assert_eq!(summary.mood_counts[&Mood::Stressed], 0);
    }

    #[test]
    fn test_today_counts_and_teas() {
        let logs = vec![
            log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(days_ago(3), Mood::Tired, TeaType::BlackTea, TimeOfDay::Morning),
            log(today(), Mood::Tired, TeaType::Herbal, TimeOfDay::Evening),
            log(today(), Mood::Happy, TeaType::GreenTea, TimeOfDay::Morning),
        ];
        let summary = today_summary(&logs, today());
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_mg, 70);
        assert_eq!(
            summary.teas,
            vec![TeaType::GreenTea, TeaType::Herbal, TeaType::GreenTea]
        );
        assert_eq!(summary.tea_counts[&TeaType::GreenTea], 2);
        assert_eq!(summary.tea_counts[&TeaType::BlackTea], 0);
        assert_eq!(summary.time_of_day_counts[&TimeOfDay::Morning], 2);
        assert_eq!(summary.time_of_day_counts[&TimeOfDay::Afternoon], 0);
        assert_eq!(summary.time_of_day_counts[&TimeOfDay::Evening], 1);
    }

    #[test]
    fn test_count_maps_use_declaration_order() {
        let summary = today_summary(&[], today());
        let moods: Vec<Mood> = summary.mood_counts.keys().copied().collect();
        assert_eq!(moods, Mood::ALL.to_vec());
        let times: Vec<TimeOfDay> = summary.time_of_day_counts.keys().copied().collect();
        assert_eq!(times, TimeOfDay::ALL.to_vec());
    }

    #[test]
    fn test_logs_on_keeps_order() {
        let a = log(today(), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning);
        let b = log(days_ago(1), Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning);
        let c = log(today(), Mood::Tired, TeaType::Oolong, TimeOfDay::Evening);
        let logs = vec![a.clone(), b, c.clone()];
        assert_eq!(logs_on(&logs, today()), vec![a, c]);
    }

    #[test]
    fn test_series_at_calendar_edges() {
        let min = NaiveDate::MIN;
        let logs = vec![
            log(min, Mood::Calm, TeaType::GreenTea, TimeOfDay::Morning),
            log(min + Days::new(1), Mood::Calm, TeaType::BlackTea, TimeOfDay::Morning),
        ];
        let series = weekly_series(&logs, min);
        assert_eq!(series[0].date, min);
        assert_eq!(series[0].total_mg, 35);
        // Days after `today` stay empty
        assert_eq!(series[1].total_mg, 0);
        assert_eq!(weekly_total(&logs, min), 35);

        let max = NaiveDate::MAX;
        let series = weekly_series(&[], max);
        assert_eq!(series[6].date, max);
        assert_eq!(series[0].date, max - Days::new(6));
    }
}
