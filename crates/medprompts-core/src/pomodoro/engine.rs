//! Pomodoro engine.
//!
//! A wall-clock countdown over three modes. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically
//! (once a second is plenty).
//!
//! ## Mode Transitions
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//!                    (every `long_break_interval`-th focus)
//! ```
//!
//! Every transition stops the countdown; the next phase needs `start()`.

use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::notify::{NotificationPermission, NotificationSink};
use crate::events::Event;
use crate::fanout::{Fanout, Topic};
use crate::storage::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl PomodoroMode {
    pub fn label(&self) -> &'static str {
        match self {
            PomodoroMode::Focus => "Focus",
            PomodoroMode::ShortBreak => "Short break",
            PomodoroMode::LongBreak => "Long break",
        }
    }
}

/// Phase lengths in minutes and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroDurations {
    pub focus_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
    pub long_break_interval: u32,
}

impl Default for PomodoroDurations {
    fn default() -> Self {
        Self {
            focus_min: 25,
            short_break_min: 5,
            long_break_min: 15,
            long_break_interval: 4,
        }
    }
}

impl PomodoroDurations {
    pub fn minutes(&self, mode: PomodoroMode) -> u32 {
        match mode {
            PomodoroMode::Focus => self.focus_min,
            PomodoroMode::ShortBreak => self.short_break_min,
            PomodoroMode::LongBreak => self.long_break_min,
        }
    }

    pub fn duration_ms(&self, mode: PomodoroMode) -> u64 {
        self.minutes(mode) as u64 * 60 * 1000
    }
}

/// Persisted countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroTimer {
    pub mode: PomodoroMode,
    pub is_running: bool,
    pub remaining_ms: u64,
    pub completed_pomodoros: u32,
    /// Wall clock (ms since epoch) of the last flush while running.
    #[serde(default)]
    pub last_tick_epoch_ms: Option<u64>,
    /// When the current phase was first started.
    #[serde(default)]
    pub phase_started_at: Option<DateTime<Utc>>,
}

impl PomodoroTimer {
    pub fn new(durations: &PomodoroDurations) -> Self {
        Self {
            mode: PomodoroMode::Focus,
            is_running: false,
            remaining_ms: durations.duration_ms(PomodoroMode::Focus),
            completed_pomodoros: 0,
            last_tick_epoch_ms: None,
            phase_started_at: None,
        }
    }
}

/// One finished or abandoned phase. History is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSessionRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub mode: PomodoroMode,
    pub duration_min: u32,
    pub completed: bool,
}

/// Sole writer of the `pomodoro-timer` and `pomodoro-history` documents.
pub struct PomodoroEngine {
    store: Rc<Store>,
    fanout: Fanout,
    sink: Box<dyn NotificationSink>,
    durations: PomodoroDurations,
    timer: PomodoroTimer,
    history: Vec<PomodoroSessionRecord>,
}

impl PomodoroEngine {
    pub fn new(
        store: Rc<Store>,
        fanout: Fanout,
        durations: PomodoroDurations,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        let timer = Self::read_timer(&store, &durations);
        let history = store.load(keys::POMODORO_HISTORY, Vec::new());
        Self {
            store,
            fanout,
            sink,
            durations,
            timer,
            history,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub fn mode(&self) -> PomodoroMode {
        self.timer.mode
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running
    }

    pub fn remaining_ms(&self) -> u64 {
        self.timer.remaining_ms
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.timer.completed_pomodoros
    }

    pub fn total_ms(&self) -> u64 {
        self.durations.duration_ms(self.timer.mode)
    }

    pub fn durations(&self) -> &PomodoroDurations {
        &self.durations
    }

    pub fn history(&self) -> &[PomodoroSessionRecord] {
        &self.history
    }

    /// Re-read both documents, replacing the in-memory copies.
    pub fn load_history(&mut self) -> Vec<PomodoroSessionRecord> {
        self.history = self.store.load(keys::POMODORO_HISTORY, Vec::new());
        self.timer = Self::read_timer(&self.store, &self.durations);
        self.history.clone()
    }

    fn read_timer(store: &Store, durations: &PomodoroDurations) -> PomodoroTimer {
        let mut timer = store.load(keys::POMODORO_TIMER, PomodoroTimer::new(durations));
        // Durations may have changed since the timer was saved.
        timer.remaining_ms = timer.remaining_ms.min(durations.duration_ms(timer.mode));
        timer
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.timer.mode,
            is_running: self.timer.is_running,
            remaining_ms: self.timer.remaining_ms,
            total_ms: self.total_ms(),
            completed_pomodoros: self.timer.completed_pomodoros,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.timer.is_running {
            return None;
        }
        self.timer.is_running = true;
        self.timer.last_tick_epoch_ms = Some(now_ms);
        if self.timer.phase_started_at.is_none() {
            self.timer.phase_started_at = Some(epoch_ms_to_utc(now_ms));
        }
        self.commit();
        Some(Event::TimerStarted {
            mode: self.timer.mode,
            remaining_ms: self.timer.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Stop the countdown, keeping the remaining time. If the countdown ran
    /// out in the meantime, the phase completes instead.
    pub fn pause_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.timer.is_running {
            return None;
        }
        if let Some(done) = self.tick_at(now_ms) {
            return Some(done);
        }
        self.timer.is_running = false;
        self.timer.last_tick_epoch_ms = None;
        self.commit();
        Some(Event::TimerPaused {
            mode: self.timer.mode,
            remaining_ms: self.timer.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Restore the current mode's full duration and stop.
    pub fn reset(&mut self) -> Option<Event> {
        self.timer.is_running = false;
        self.timer.last_tick_epoch_ms = None;
        self.timer.phase_started_at = None;
        self.timer.remaining_ms = self.total_ms();
        self.commit();
        Some(Event::TimerReset {
            mode: self.timer.mode,
            remaining_ms: self.timer.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn skip(&mut self) -> Option<Event> {
        Some(self.finish_phase(false))
    }

    /// Call periodically. Returns `Some(Event::PhaseCompleted)` when the countdown ends.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.timer.is_running {
            return None;
        }
        let last = self.timer.last_tick_epoch_ms.unwrap_or(now_ms);
        self.timer.last_tick_epoch_ms = Some(now_ms);
        self.elapse(now_ms.saturating_sub(last))
    }

    /// Count down by `elapsed_ms` if running.
    pub fn elapse(&mut self, elapsed_ms: u64) -> Option<Event> {
        if !self.timer.is_running {
            return None;
        }
        self.timer.remaining_ms = self.timer.remaining_ms.saturating_sub(elapsed_ms);
        if self.timer.remaining_ms == 0 {
            return Some(self.finish_phase(true));
        }
        self.commit();
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_phase(&mut self, completed: bool) -> Event {
        let from = self.timer.mode;
        let ended_at = Utc::now();

        if from == PomodoroMode::Focus {
            self.timer.completed_pomodoros += 1;
        }
        let to = match from {
            PomodoroMode::Focus => {
                let interval = self.durations.long_break_interval.max(1);
                if self.timer.completed_pomodoros % interval == 0 {
                    PomodoroMode::LongBreak
                } else {
                    PomodoroMode::ShortBreak
                }
            }
            PomodoroMode::ShortBreak | PomodoroMode::LongBreak => PomodoroMode::Focus,
        };

        let planned_ms = self.durations.duration_ms(from);
        let started_at = self.timer.phase_started_at.unwrap_or_else(|| {
            let spent = planned_ms.saturating_sub(self.timer.remaining_ms);
            ended_at - Duration::milliseconds(spent as i64)
        });
        self.history.push(PomodoroSessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            ended_at,
            mode: from,
            duration_min: self.durations.minutes(from),
            completed,
        });
        self.store.save(keys::POMODORO_HISTORY, &self.history);

        self.timer.mode = to;
        self.timer.is_running = false;
        self.timer.last_tick_epoch_ms = None;
        self.timer.phase_started_at = None;
        self.timer.remaining_ms = self.durations.duration_ms(to);
        self.commit();

        let completed_pomodoros = self.timer.completed_pomodoros;
        if completed {
            tracing::info!(from = ?from, to = ?to, completed_pomodoros, "pomodoro phase completed");
            self.notify_phase_end(from, to);
            Event::PhaseCompleted {
                from,
                to,
                completed_pomodoros,
                at: ended_at,
            }
        } else {
            tracing::debug!(from = ?from, to = ?to, "pomodoro phase skipped");
            Event::PhaseSkipped {
                from,
                to,
                completed_pomodoros,
                at: ended_at,
            }
        }
    }

    fn notify_phase_end(&self, from: PomodoroMode, to: PomodoroMode) {
        if self.sink.permission() != NotificationPermission::Granted {
            return;
        }
        let title = format!("{} finished", from.label());
        let body = format!(
            "Next up: {} ({} min)",
            to.label().to_lowercase(),
            self.durations.minutes(to)
        );
        self.sink.notify(&title, &body);
    }

    fn commit(&mut self) {
        self.store.save(keys::POMODORO_TIMER, &self.timer);
        self.fanout.publish(Topic::Pomodoro);
    }

    /// Back to a fresh focus phase with an empty history.
    pub fn clear(&mut self) {
        self.timer = PomodoroTimer::new(&self.durations);
        self.history.clear();
        self.store.save(keys::POMODORO_HISTORY, &self.history);
        self.commit();
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn epoch_ms_to_utc(ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_else(Utc::now)
}
