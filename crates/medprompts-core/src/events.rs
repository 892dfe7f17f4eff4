use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pomodoro::PomodoroMode;

/// Every pomodoro command that changes state produces an Event.
/// The CLI prints them; the fan-out only carries the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: PomodoroMode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: PomodoroMode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: PomodoroMode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero.
    PhaseCompleted {
        from: PomodoroMode,
        to: PomodoroMode,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
    /// User jumped to the next phase before the countdown ended.
    PhaseSkipped {
        from: PomodoroMode,
        to: PomodoroMode,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: PomodoroMode,
        is_running: bool,
        remaining_ms: u64,
        total_ms: u64,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
}
