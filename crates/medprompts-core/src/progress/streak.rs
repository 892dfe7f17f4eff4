//! Calendar-day streak rules.
//!
//! Streaks compare calendar dates, never elapsed seconds: 23:59 and 00:01 on
//! the next day are one day apart.

use chrono::NaiveDate;

/// Streak after recording activity on `today`.
///
/// - first activity ever: 1
/// - same day as the last activity: unchanged (at least 1)
/// - exactly one day later: +1
/// - two or more days later: reset to 1, `today` starts a new run
/// - a date earlier than the last activity (clock moved back): unchanged
pub fn update_streak(last_active: Option<NaiveDate>, today: NaiveDate, current: u32) -> u32 {
    let Some(last) = last_active else {
        return 1;
    };
    match (today - last).num_days() {
        0 => current.max(1),
        1 => current.saturating_add(1),
        d if d < 0 => current.max(1),
        _ => 1,
    }
}

/// Streak as it should be displayed on `today`, without recording activity.
///
/// A run is still alive on the day after the last activity; after that it
/// reads as 0 until the next activity restarts it.
pub fn effective_streak(last_active: Option<NaiveDate>, today: NaiveDate, current: u32) -> u32 {
    match last_active {
        Some(last) if (today - last).num_days() <= 1 => current,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn first_activity_starts_at_one() {
        assert_eq!(update_streak(None, d(10), 0), 1);
    }

    #[test]
    fn same_day_is_unchanged() {
        assert_eq!(update_streak(Some(d(10)), d(10), 4), 4);
    }

    #[test]
    fn next_day_increments() {
        assert_eq!(update_streak(Some(d(10)), d(11), 4), 5);
    }

    #[test]
    fn gap_resets_to_one() {
        assert_eq!(update_streak(Some(d(10)), d(12), 4), 1);
        assert_eq!(update_streak(Some(d(1)), d(30), 29), 1);
    }

    #[test]
    fn crosses_month_boundary() {
        let feb_end = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(update_streak(Some(feb_end), d(1), 2), 3);
    }

    #[test]
    fn backwards_clock_keeps_streak() {
        assert_eq!(update_streak(Some(d(10)), d(9), 3), 3);
    }

    #[test]
    fn effective_streak_decays_on_read() {
        assert_eq!(effective_streak(Some(d(10)), d(10), 3), 3);
        assert_eq!(effective_streak(Some(d(10)), d(11), 3), 3);
        assert_eq!(effective_streak(Some(d(10)), d(12), 3), 0);
        assert_eq!(effective_streak(None, d(12), 0), 0);
    }
}
