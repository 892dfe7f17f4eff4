mod engine;
pub mod levels;
pub mod streak;

pub use engine::{ProgressEngine, PromptUse, UserProgress};
pub use levels::{
    calculate_level, calculate_level_progress, level_summary, xp_to_next_level, LevelInfo,
    LevelSummary, LEVELS, MAX_LEVEL,
};
pub use streak::{effective_streak, update_streak};
