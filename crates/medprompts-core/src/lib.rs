//! # MedPrompts Core Library
//!
//! Gamification and study-progress state for the MedPrompts prompt library.
//! The `medprompts` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Progress**: XP, level table, calendar-day streaks
//! - **Badges**: static catalog, monotonic unlocks
//! - **Challenge**: one rotating challenge per ISO week, bonus XP on completion
//! - **Pomodoro**: wall-clock countdown state machine with session history
//! - **Storage**: SQLite key-value documents and TOML configuration
//! - **Fanout**: synchronous publish/subscribe for change notifications
//!
//! ## Key Components
//!
//! - [`MedPrompts`]: explicit state holder wiring the engines together
//! - [`Store`]: typed, fail-soft persistence adapter
//! - [`Fanout`]: change notifications by [`Topic`]
//! - [`Config`]: application configuration management

pub mod app;
pub mod auth;
pub mod badges;
pub mod challenge;
pub mod error;
pub mod events;
pub mod fanout;
pub mod pomodoro;
pub mod progress;
pub mod stats;
pub mod storage;

pub use app::{MedPrompts, PollOutcome, TaskOutcome, UsageOutcome};
pub use auth::{authorize, AuthState, Principal, TokenRejection, TokenValidator};
pub use badges::{Badge, BadgeEngine, BadgeTier, UserBadges};
pub use challenge::{ChallengeEngine, ChallengeView, WeekId, WeeklyChallengeState};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use fanout::{Fanout, Subscription, Topic};
pub use pomodoro::{
    NotificationPermission, NotificationSink, PomodoroEngine, PomodoroMode, PomodoroSessionRecord,
    SilentSink,
};
pub use progress::{
    calculate_level, calculate_level_progress, xp_to_next_level, ProgressEngine, PromptUse,
    UserProgress,
};
pub use stats::{Dashboard, PomodoroStats};
pub use storage::{Config, Database, Store};
