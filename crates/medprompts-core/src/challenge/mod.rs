mod engine;
pub mod templates;
mod week;

pub use engine::{
    ArchivedChallenge, ChallengeEngine, ChallengeTask, ChallengeView, WeeklyChallenge,
    WeeklyChallengeState, HISTORY_LIMIT,
};
pub use week::WeekId;
