//! Static badge catalog.
//!
//! Catalog order is display order. Rules only look at counters that never
//! decrease, so a badge that unlocks never needs to be re-checked.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::progress::UserProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Everything a rule may inspect besides [`UserProgress`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageContext {
    /// Local time of the prompt use being evaluated, if any.
    pub prompt_used_at: Option<NaiveDateTime>,
    pub completed_pomodoros: u64,
    pub challenges_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    PromptsUsed { at_least: u64 },
    StreakDays { at_least: u32 },
    LevelReached { at_least: u32 },
    CategoriesExplored { at_least: usize },
    PomodorosCompleted { at_least: u64 },
    ChallengesCompleted { at_least: u32 },
    /// A prompt used with the local hour in `from_hour..to_hour`.
    UsedDuring { from_hour: u32, to_hour: u32 },
}

impl BadgeRule {
    pub fn is_met(&self, progress: &UserProgress, usage: &UsageContext) -> bool {
        match *self {
            BadgeRule::PromptsUsed { at_least } => progress.total_prompts_used >= at_least,
            BadgeRule::StreakDays { at_least } => {
                progress.streak.max(progress.longest_streak) >= at_least
            }
            BadgeRule::LevelReached { at_least } => progress.level >= at_least,
            BadgeRule::CategoriesExplored { at_least } => {
                progress.categories_explored() >= at_least
            }
            BadgeRule::PomodorosCompleted { at_least } => usage.completed_pomodoros >= at_least,
            BadgeRule::ChallengesCompleted { at_least } => usage.challenges_completed >= at_least,
            BadgeRule::UsedDuring { from_hour, to_hour } => usage
                .prompt_used_at
                .map(|at| (from_hour..to_hour).contains(&at.hour()))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: BadgeTier,
    pub rule: BadgeRule,
}

const fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    tier: BadgeTier,
    rule: BadgeRule,
) -> Badge {
    Badge {
        id,
        name,
        description,
        icon,
        tier,
        rule,
    }
}

pub const CATALOG: &[Badge] = &[
    badge(
        "first-prompt",
        "First Consult",
        "Use your first prompt",
        "🩺",
        BadgeTier::Bronze,
        BadgeRule::PromptsUsed { at_least: 1 },
    ),
    badge(
        "prompts-10",
        "Study Habit",
        "Use 10 prompts",
        "📚",
        BadgeTier::Bronze,
        BadgeRule::PromptsUsed { at_least: 10 },
    ),
    badge(
        "prompts-50",
        "Case Cruncher",
        "Use 50 prompts",
        "🧪",
        BadgeTier::Silver,
        BadgeRule::PromptsUsed { at_least: 50 },
    ),
    badge(
        "prompts-100",
        "Centurion",
        "Use 100 prompts",
        "🏅",
        BadgeTier::Gold,
        BadgeRule::PromptsUsed { at_least: 100 },
    ),
    badge(
        "prompts-500",
        "Walking Textbook",
        "Use 500 prompts",
        "📖",
        BadgeTier::Platinum,
        BadgeRule::PromptsUsed { at_least: 500 },
    ),
    badge(
        "streak-3",
        "On Call",
        "Study 3 days in a row",
        "🔥",
        BadgeTier::Bronze,
        BadgeRule::StreakDays { at_least: 3 },
    ),
    badge(
        "streak-7",
        "Full Rotation",
        "Study 7 days in a row",
        "📅",
        BadgeTier::Silver,
        BadgeRule::StreakDays { at_least: 7 },
    ),
    badge(
        "streak-30",
        "Iron Intern",
        "Study 30 days in a row",
        "🏆",
        BadgeTier::Gold,
        BadgeRule::StreakDays { at_least: 30 },
    ),
    badge(
        "level-5",
        "Intern Status",
        "Reach level 5",
        "💉",
        BadgeTier::Silver,
        BadgeRule::LevelReached { at_least: 5 },
    ),
    badge(
        "level-10",
        "Professor Emeritus",
        "Reach the top level",
        "🎓",
        BadgeTier::Platinum,
        BadgeRule::LevelReached { at_least: 10 },
    ),
    badge(
        "explorer",
        "Generalist",
        "Use prompts from 5 different specialties",
        "🧭",
        BadgeTier::Silver,
        BadgeRule::CategoriesExplored { at_least: 5 },
    ),
    badge(
        "night-owl",
        "Night Shift",
        "Use a prompt between midnight and 5am",
        "🦉",
        BadgeTier::Bronze,
        BadgeRule::UsedDuring {
            from_hour: 0,
            to_hour: 5,
        },
    ),
    badge(
        "early-bird",
        "Morning Rounds",
        "Use a prompt between 5am and 7am",
        "🌅",
        BadgeTier::Bronze,
        BadgeRule::UsedDuring {
            from_hour: 5,
            to_hour: 7,
        },
    ),
    badge(
        "focus-1",
        "First Focus",
        "Complete a pomodoro",
        "🍅",
        BadgeTier::Bronze,
        BadgeRule::PomodorosCompleted { at_least: 1 },
    ),
    badge(
        "focus-25",
        "Deep Worker",
        "Complete 25 pomodoros",
        "⏱️",
        BadgeTier::Gold,
        BadgeRule::PomodorosCompleted { at_least: 25 },
    ),
    badge(
        "challenge-1",
        "Weekly Warrior",
        "Complete a weekly challenge",
        "⚔️",
        BadgeTier::Silver,
        BadgeRule::ChallengesCompleted { at_least: 1 },
    ),
    badge(
        "challenge-4",
        "Monthly Marathoner",
        "Complete 4 weekly challenges",
        "🗓️",
        BadgeTier::Gold,
        BadgeRule::ChallengesCompleted { at_least: 4 },
    ),
];

pub fn find(id: &str) -> Option<&'static Badge> {
    CATALOG.iter().find(|b| b.id == id)
}
