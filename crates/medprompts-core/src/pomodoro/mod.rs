mod engine;
mod notify;

pub use engine::{
    PomodoroDurations, PomodoroEngine, PomodoroMode, PomodoroSessionRecord, PomodoroTimer,
};
pub use notify::{NotificationPermission, NotificationSink, RecordingSink, SilentSink};
