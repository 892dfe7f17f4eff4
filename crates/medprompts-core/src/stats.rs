//! Statistics over the pomodoro history and progress counters.

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeView;
use crate::pomodoro::{PomodoroMode, PomodoroSessionRecord};
use crate::progress::LevelSummary;

/// Days covered by [`PomodoroStats::daily`], today included.
pub const DAILY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub pomodoros: u64,
    pub focus_min: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroStats {
    pub total_sessions: u64,
    pub completed_pomodoros: u64,
    pub skipped_focus: u64,
    pub total_focus_min: u64,
    pub total_break_min: u64,
    pub today_pomodoros: u64,
    pub today_focus_min: u64,
    /// Oldest first, ending with today.
    pub daily: Vec<DailyFocus>,
}

impl PomodoroStats {
    /// Aggregate `history`, bucketing days in `tz`.
    pub fn compute<Tz: TimeZone>(
        history: &[PomodoroSessionRecord],
        today: NaiveDate,
        tz: &Tz,
    ) -> Self {
        let first_day = today - Duration::days(DAILY_WINDOW_DAYS - 1);
        let mut stats = PomodoroStats {
            daily: (0..DAILY_WINDOW_DAYS)
                .map(|i| DailyFocus {
                    date: first_day + Duration::days(i),
                    pomodoros: 0,
                    focus_min: 0,
                })
                .collect(),
            ..Default::default()
        };

        for rec in history {
            stats.total_sessions += 1;
            let minutes = rec.duration_min as u64;
            match (rec.mode, rec.completed) {
                (PomodoroMode::Focus, true) => {
                    stats.completed_pomodoros += 1;
                    stats.total_focus_min += minutes;
                    let day = rec.ended_at.with_timezone(tz).date_naive();
                    if day == today {
                        stats.today_pomodoros += 1;
                        stats.today_focus_min += minutes;
                    }
                    if day >= first_day && day <= today {
                        let bucket = &mut stats.daily[(day - first_day).num_days() as usize];
                        bucket.pomodoros += 1;
                        bucket.focus_min += minutes;
                    }
                }
                (PomodoroMode::Focus, false) => stats.skipped_focus += 1,
                (_, true) => stats.total_break_min += minutes,
                (_, false) => {}
            }
        }
        stats
    }
}

/// Everything a dashboard shows, in one read.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub xp: u64,
    pub level: LevelSummary,
    /// Streak as of today (0 once broken).
    pub streak: u32,
    pub longest_streak: u32,
    pub total_prompts_used: u64,
    pub categories_explored: usize,
    pub badges_earned: usize,
    pub badges_total: usize,
    pub challenge: ChallengeView,
    pub challenges_completed: u32,
    pub pomodoro: PomodoroStats,
}
