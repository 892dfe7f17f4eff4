//! XP → level mapping.
//!
//! A fixed, strictly increasing threshold table. Every XP value maps to a
//! level; values past the last threshold clamp at the top level.

use serde::{Deserialize, Serialize};

/// One row of the level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: u32,
    pub name: &'static str,
    pub icon: &'static str,
    /// XP needed to reach this level.
    pub min_xp: u64,
}

/// Owned snapshot of a [`LevelInfo`], for places that deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: u32,
    pub name: String,
    pub icon: String,
    pub progress_pct: u8,
    pub xp_to_next_level: u64,
}

const fn level(level: u32, name: &'static str, icon: &'static str, min_xp: u64) -> LevelInfo {
    LevelInfo {
        level,
        name,
        icon,
        min_xp,
    }
}

pub const LEVELS: [LevelInfo; 10] = [
    level(1, "Freshman", "🩺", 0),
    level(2, "Anatomy Apprentice", "🦴", 100),
    level(3, "Pre-clinical Scholar", "🔬", 250),
    level(4, "Clerk", "📋", 500),
    level(5, "Intern", "💉", 1_000),
    level(6, "Resident", "🏥", 2_000),
    level(7, "Chief Resident", "⚕️", 3_500),
    level(8, "Fellow", "🧠", 5_000),
    level(9, "Attending", "👨‍⚕️", 7_500),
    level(10, "Professor", "🎓", 10_000),
];

pub const MAX_LEVEL: u32 = LEVELS[LEVELS.len() - 1].level;

fn level_index(xp: u64) -> usize {
    // LEVELS[0].min_xp is 0, so at least one row always matches.
    LEVELS.iter().rposition(|l| xp >= l.min_xp).unwrap_or(0)
}

/// Level reached with `xp` total experience.
pub fn calculate_level(xp: u64) -> LevelInfo {
    LEVELS[level_index(xp)]
}

/// Percentage of the current level's XP band already earned, 0..=100.
///
/// The top level has no band and always reports 100.
pub fn calculate_level_progress(xp: u64) -> u8 {
    let idx = level_index(xp);
    let Some(next) = LEVELS.get(idx + 1) else {
        return 100;
    };
    let floor = LEVELS[idx].min_xp;
    let band = next.min_xp - floor;
    let earned = xp - floor;
    ((earned * 100) / band).min(100) as u8
}

/// XP still missing before the next level; 0 at the top level.
pub fn xp_to_next_level(xp: u64) -> u64 {
    match LEVELS.get(level_index(xp) + 1) {
        Some(next) => next.min_xp - xp,
        None => 0,
    }
}

pub fn level_summary(xp: u64) -> LevelSummary {
    let info = calculate_level(xp);
    LevelSummary {
        level: info.level,
        name: info.name.to_string(),
        icon: info.icon.to_string(),
        progress_pct: calculate_level_progress(xp),
        xp_to_next_level: xp_to_next_level(xp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds_are_strictly_increasing() {
        for pair in LEVELS.windows(2) {
            assert!(pair[0].min_xp < pair[1].min_xp);
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
        assert_eq!(LEVELS[0].min_xp, 0);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(calculate_level(0).level, 1);
        assert_eq!(calculate_level(99).level, 1);
        assert_eq!(calculate_level(100).level, 2);
        assert_eq!(calculate_level(249).level, 2);
        assert_eq!(calculate_level(250).level, 3);
        assert_eq!(calculate_level(10_000).level, MAX_LEVEL);
        assert_eq!(calculate_level(u64::MAX).level, MAX_LEVEL);
    }

    #[test]
    fn progress_within_band() {
        assert_eq!(calculate_level_progress(0), 0);
        assert_eq!(calculate_level_progress(50), 50);
        assert_eq!(calculate_level_progress(100), 0);
        assert_eq!(calculate_level_progress(175), 50);
        assert_eq!(calculate_level_progress(10_000), 100);
        assert_eq!(calculate_level_progress(u64::MAX), 100);
    }

    #[test]
    fn xp_to_next() {
        assert_eq!(xp_to_next_level(0), 100);
        assert_eq!(xp_to_next_level(90), 10);
        assert_eq!(xp_to_next_level(100), 150);
        assert_eq!(xp_to_next_level(9_999), 1);
        assert_eq!(xp_to_next_level(10_000), 0);
    }

    #[test]
    fn summary_matches_parts() {
        let s = level_summary(260);
        assert_eq!(s.level, 3);
        assert_eq!(s.name, "Pre-clinical Scholar");
        assert_eq!(s.progress_pct, 4);
        assert_eq!(s.xp_to_next_level, 240);
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0u64..20_000, b in 0u64..20_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(calculate_level(lo).level <= calculate_level(hi).level);
        }

        #[test]
        fn level_is_stable(xp in any::<u64>()) {
            prop_assert_eq!(calculate_level(xp), calculate_level(xp));
        }

        #[test]
        fn next_level_zero_iff_max(xp in any::<u64>()) {
            prop_assert_eq!(xp_to_next_level(xp) == 0, calculate_level(xp).level == MAX_LEVEL);
        }

        #[test]
        fn progress_is_a_percentage(xp in any::<u64>()) {
            prop_assert!(calculate_level_progress(xp) <= 100);
        }
    }
}
