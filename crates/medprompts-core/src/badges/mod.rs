pub mod catalog;
mod engine;

pub use catalog::{Badge, BadgeRule, BadgeTier, UsageContext, CATALOG};
pub use engine::{BadgeEngine, BadgeStatus, UserBadges};
