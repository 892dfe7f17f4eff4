//! Progress engine: XP, level, streak and usage counters.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::levels::{calculate_level, level_summary, LevelSummary};
use super::streak::{effective_streak, update_streak};
use crate::fanout::{Fanout, Topic};
use crate::storage::{keys, Store};

/// Persisted progress document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    #[serde(default)]
    pub xp: u64,
    /// Derived from `xp`; recomputed on every load and mutation.
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_prompts_used: u64,
    /// Prompt uses per library category.
    #[serde(default)]
    pub category_usage: BTreeMap<String, u64>,
}

fn default_level() -> u32 {
    1
}

impl UserProgress {
    /// Zero-valued progress at level 1.
    pub fn new() -> Self {
        Self {
            level: 1,
            ..Self::default()
        }
    }

    fn normalized(mut self) -> Self {
        self.level = calculate_level(self.xp).level;
        self.longest_streak = self.longest_streak.max(self.streak);
        self
    }

    pub fn categories_explored(&self) -> usize {
        self.category_usage.len()
    }
}

/// One use of a library prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptUse {
    pub prompt_id: Option<String>,
    pub category: Option<String>,
    /// Local wall-clock time of the use.
    pub at: NaiveDateTime,
}

impl PromptUse {
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(at: NaiveDateTime) -> Self {
        Self {
            prompt_id: None,
            category: None,
            at,
        }
    }

    pub fn with_prompt(mut self, prompt_id: impl Into<String>) -> Self {
        self.prompt_id = Some(prompt_id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Sole writer of the `progress-state` document.
pub struct ProgressEngine {
    store: Rc<Store>,
    fanout: Fanout,
    xp_per_prompt: u64,
    state: UserProgress,
}

impl ProgressEngine {
    pub fn new(store: Rc<Store>, fanout: Fanout, xp_per_prompt: u64) -> Self {
        let state = Self::read(&store);
        Self {
            store,
            fanout,
            xp_per_prompt,
            state,
        }
    }

    fn read(store: &Store) -> UserProgress {
        store.load(keys::PROGRESS, UserProgress::new()).normalized()
    }

    /// Re-read the persisted document, replacing the in-memory copy.
    pub fn load_progress(&mut self) -> UserProgress {
        self.state = Self::read(&self.store);
        self.state.clone()
    }

    /// Current in-memory snapshot.
    pub fn progress(&self) -> &UserProgress {
        &self.state
    }

    pub fn xp_per_prompt(&self) -> u64 {
        self.xp_per_prompt
    }

    /// Record one prompt use right now.
    pub fn record_prompt_usage(&mut self) -> UserProgress {
        self.record_prompt_usage_with(&PromptUse::now())
    }

    /// Record one prompt use at the time carried by `usage`.
    pub fn record_prompt_usage_with(&mut self, usage: &PromptUse) -> UserProgress {
        let today = usage.at.date();
        let s = &mut self.state;
        s.total_prompts_used += 1;
        s.xp = s.xp.saturating_add(self.xp_per_prompt);
        s.streak = update_streak(s.last_active_date, today, s.streak);
        s.last_active_date = Some(match s.last_active_date {
            Some(last) if last > today => last,
            _ => today,
        });
        if let Some(category) = usage.category.as_deref().filter(|c| !c.is_empty()) {
            *s.category_usage.entry(category.to_string()).or_default() += 1;
        }
        let before = s.level;
        self.commit();

        tracing::debug!(
            xp = self.state.xp,
            streak = self.state.streak,
            total = self.state.total_prompts_used,
            prompt = usage.prompt_id.as_deref().unwrap_or("-"),
            "prompt usage recorded"
        );
        if self.state.level > before {
            tracing::info!(level = self.state.level, "level up");
        }
        self.state.clone()
    }

    /// Add XP that is not tied to a prompt use. Counters and streak stay as they are.
    pub fn award_bonus_xp(&mut self, amount: u64, reason: &str) -> UserProgress {
        if amount == 0 {
            return self.state.clone();
        }
        self.state.xp = self.state.xp.saturating_add(amount);
        self.commit();
        tracing::info!(amount, reason, xp = self.state.xp, "bonus xp awarded");
        self.state.clone()
    }

    /// Streak as displayed on `today`; see [`effective_streak`].
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        effective_streak(self.state.last_active_date, today, self.state.streak)
    }

    pub fn level_summary(&self) -> LevelSummary {
        level_summary(self.state.xp)
    }

    /// Drop all progress.
    pub fn reset(&mut self) {
        self.state = UserProgress::new();
        self.commit();
    }

    fn commit(&mut self) {
        self.state = std::mem::take(&mut self.state).normalized();
        self.store.save(keys::PROGRESS, &self.state);
        self.fanout.publish(Topic::Progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn engine() -> ProgressEngine {
        ProgressEngine::new(Rc::new(Store::in_memory()), Fanout::new(), 10)
    }

    fn on(day: u32) -> PromptUse {
        PromptUse::at(
            NaiveDate::from_ymd_opt(2026, 5, day)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn fresh_state_is_zero_at_level_one() {
        let mut e = engine();
        let p = e.load_progress();
        assert_eq!(p.xp, 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.streak, 0);
        assert_eq!(p.total_prompts_used, 0);
        assert!(p.last_active_date.is_none());
    }

    #[test]
    fn first_use_end_to_end() {
        let mut e = engine();
        e.record_prompt_usage_with(&on(1));
        let p = e.load_progress();
        assert_eq!(p.xp, 10);
        assert_eq!(p.total_prompts_used, 1);
        assert_eq!(p.streak, 1);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn n_uses_add_n_awards() {
        let mut e = engine();
        for _ in 0..7 {
            e.record_prompt_usage_with(&on(1));
        }
        let p = e.progress();
        assert_eq!(p.total_prompts_used, 7);
        assert_eq!(p.xp, 70);
        assert_eq!(p.streak, 1);
    }

    #[test]
    fn streak_follows_calendar_days() {
        let mut e = engine();
        e.record_prompt_usage_with(&on(1));
        e.record_prompt_usage_with(&on(2));
        e.record_prompt_usage_with(&on(3));
        assert_eq!(e.progress().streak, 3);
        e.record_prompt_usage_with(&on(3));
        assert_eq!(e.progress().streak, 3);
        e.record_prompt_usage_with(&on(6));
        assert_eq!(e.progress().streak, 1);
        assert_eq!(e.progress().longest_streak, 3);
    }

    #[test]
    fn level_recomputed_from_xp() {
        let mut e = engine();
        for _ in 0..10 {
            e.record_prompt_usage_with(&on(1));
        }
        assert_eq!(e.progress().xp, 100);
        assert_eq!(e.progress().level, 2);
    }

    #[test]
    fn stored_level_is_ignored_on_load() {
        let store = Rc::new(Store::in_memory());
        store
            .backend()
            .set(keys::PROGRESS, r#"{"xp":300,"level":9,"streak":2}"#)
            .unwrap();
        let e = ProgressEngine::new(store, Fanout::new(), 10);
        assert_eq!(e.progress().level, 3);
        assert_eq!(e.progress().longest_streak, 2);
    }

    #[test]
    fn corrupt_state_loads_default() {
        let store = Rc::new(Store::in_memory());
        store.backend().set(keys::PROGRESS, "garbage").unwrap();
        let e = ProgressEngine::new(store, Fanout::new(), 10);
        assert_eq!(e.progress(), &UserProgress::new());
    }

    #[test]
    fn writes_are_visible_to_a_fresh_reader() {
        let store = Rc::new(Store::in_memory());
        let mut writer = ProgressEngine::new(Rc::clone(&store), Fanout::new(), 10);
        writer.record_prompt_usage_with(&on(1).with_category("cardiology"));
        let reader = ProgressEngine::new(store, Fanout::new(), 10);
        assert_eq!(reader.progress().xp, 10);
        assert_eq!(reader.progress().category_usage.get("cardiology"), Some(&1));
    }

    #[test]
    fn bonus_xp_leaves_counters_alone() {
        let mut e = engine();
        e.record_prompt_usage_with(&on(1));
        let p = e.award_bonus_xp(100, "weekly challenge");
        assert_eq!(p.xp, 110);
        assert_eq!(p.level, 2);
        assert_eq!(p.total_prompts_used, 1);
        assert_eq!(p.streak, 1);
    }

    #[test]
    fn every_mutation_publishes() {
        let fanout = Fanout::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _s = fanout.subscribe(Topic::Progress, move |_| h.set(h.get() + 1));
        let mut e = ProgressEngine::new(Rc::new(Store::in_memory()), fanout, 10);
        e.record_prompt_usage_with(&on(1));
        e.award_bonus_xp(5, "test");
        e.award_bonus_xp(0, "nothing");
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn current_streak_reads_zero_after_gap() {
        let mut e = engine();
        e.record_prompt_usage_with(&on(1));
        e.record_prompt_usage_with(&on(2));
        let d = |day| NaiveDate::from_ymd_opt(2026, 5, day).unwrap();
        assert_eq!(e.current_streak(d(3)), 2);
        assert_eq!(e.current_streak(d(4)), 0);
        // Reading does not mutate.
        assert_eq!(e.progress().streak, 2);
    }

    #[test]
    fn empty_category_is_not_counted() {
        let mut e = engine();
        e.record_prompt_usage_with(&on(1).with_category(""));
        assert_eq!(e.progress().categories_explored(), 0);
    }
}
