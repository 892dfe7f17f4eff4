//! Badge engine: a monotonic set of unlocked badges.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Badge, UsageContext, CATALOG};
use crate::fanout::{Fanout, Topic};
use crate::progress::UserProgress;
use crate::storage::{keys, Store};

/// Persisted badge document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadges {
    #[serde(default)]
    pub earned: BTreeSet<String>,
    #[serde(default)]
    pub unlocked_at: BTreeMap<String, DateTime<Utc>>,
}

impl UserBadges {
    pub fn has(&self, id: &str) -> bool {
        self.earned.contains(id)
    }
}

/// Catalog entry paired with its unlock state, for display.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
    #[serde(flatten)]
    pub badge: Badge,
    pub earned: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Sole writer of the `badge-state` document.
pub struct BadgeEngine {
    store: Rc<Store>,
    fanout: Fanout,
    state: UserBadges,
}

impl BadgeEngine {
    pub fn new(store: Rc<Store>, fanout: Fanout) -> Self {
        let state = store.load(keys::BADGES, UserBadges::default());
        Self {
            store,
            fanout,
            state,
        }
    }

    /// Re-read the persisted document, replacing the in-memory copy.
    pub fn load_user_badges(&mut self) -> UserBadges {
        self.state = self.store.load(keys::BADGES, UserBadges::default());
        self.state.clone()
    }

    pub fn badges(&self) -> &UserBadges {
        &self.state
    }

    /// Unlock every catalog badge whose rule now holds.
    ///
    /// Badges another instance persisted in the meantime are merged in first,
    /// so a save never shrinks the earned set. Returns the ids this call
    /// unlocked, in catalog order.
    pub fn evaluate_unlocks(
        &mut self,
        progress: &UserProgress,
        usage: &UsageContext,
    ) -> Vec<String> {
        let merged = self.merge_persisted();
        let now = Utc::now();
        let unlocked: Vec<String> = CATALOG
            .iter()
            .filter(|b| !self.state.has(b.id))
            .filter(|b| b.rule.is_met(progress, usage))
            .map(|b| b.id.to_string())
            .collect();

        if unlocked.is_empty() {
            if merged {
                self.fanout.publish(Topic::Badges);
            }
            return unlocked;
        }

        for id in &unlocked {
            self.state.earned.insert(id.clone());
            self.state.unlocked_at.entry(id.clone()).or_insert(now);
            tracing::info!(badge = %id, "badge unlocked");
        }
        self.store.save(keys::BADGES, &self.state);
        self.fanout.publish(Topic::Badges);
        unlocked
    }

    /// Union the persisted document into memory. Returns whether anything was added.
    fn merge_persisted(&mut self) -> bool {
        let persisted = self.store.load(keys::BADGES, UserBadges::default());
        let before = self.state.earned.len();
        for id in persisted.earned {
            if let Some(at) = persisted.unlocked_at.get(&id) {
                self.state.unlocked_at.entry(id.clone()).or_insert(*at);
            }
            self.state.earned.insert(id);
        }
        self.state.earned.len() > before
    }

    /// Every catalog badge with its unlock state, in catalog order.
    pub fn statuses(&self) -> Vec<BadgeStatus> {
        CATALOG
            .iter()
            .map(|b| BadgeStatus {
                badge: *b,
                earned: self.state.has(b.id),
                unlocked_at: self.state.unlocked_at.get(b.id).copied(),
            })
            .collect()
    }

    /// Earned badges in catalog order. Ids no longer in the catalog are skipped.
    pub fn earned_in_catalog_order(&self) -> Vec<&'static Badge> {
        CATALOG.iter().filter(|b| self.state.has(b.id)).collect()
    }

    pub fn locked(&self) -> Vec<&'static Badge> {
        CATALOG.iter().filter(|b| !self.state.has(b.id)).collect()
    }

    /// Forget every unlock. Only used by an explicit user reset.
    pub fn reset(&mut self) {
        self.state = UserBadges::default();
        self.store.save(keys::BADGES, &self.state);
        self.fanout.publish(Topic::Badges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn engine() -> BadgeEngine {
        BadgeEngine::new(Rc::new(Store::in_memory()), Fanout::new())
    }

    fn progress(total: u64) -> UserProgress {
        UserProgress {
            total_prompts_used: total,
            xp: total * 10,
            streak: 1,
            ..UserProgress::new()
        }
    }

    #[test]
    fn first_use_unlocks_first_prompt() {
        let mut e = engine();
        let delta = e.evaluate_unlocks(&progress(1), &UsageContext::default());
        assert_eq!(delta, vec!["first-prompt"]);
        assert!(e.badges().has("first-prompt"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut e = engine();
        let p = progress(12);
        let first = e.evaluate_unlocks(&p, &UsageContext::default());
        assert_eq!(first, vec!["first-prompt", "prompts-10"]);
        assert!(e.evaluate_unlocks(&p, &UsageContext::default()).is_empty());
    }

    #[test]
    fn delta_is_in_catalog_order() {
        let mut e = engine();
        let usage = UsageContext {
            completed_pomodoros: 1,
            challenges_completed: 1,
            ..Default::default()
        };
        let delta = e.evaluate_unlocks(&progress(1), &usage);
        assert_eq!(delta, vec!["first-prompt", "focus-1", "challenge-1"]);
    }

    #[test]
    fn earned_never_shrinks() {
        let mut e = engine();
        e.evaluate_unlocks(&progress(10), &UsageContext::default());
        // A smaller snapshot (e.g. from a stale tab) revokes nothing.
        e.evaluate_unlocks(&UserProgress::new(), &UsageContext::default());
        assert!(e.badges().has("prompts-10"));
        assert_eq!(e.earned_in_catalog_order().len(), 2);
    }

    #[test]
    fn persists_and_publishes_only_on_change() {
        let store = Rc::new(Store::in_memory());
        let fanout = Fanout::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _s = fanout.subscribe(Topic::Badges, move |_| h.set(h.get() + 1));

        let mut e = BadgeEngine::new(Rc::clone(&store), fanout);
        e.evaluate_unlocks(&progress(1), &UsageContext::default());
        e.evaluate_unlocks(&progress(1), &UsageContext::default());
        assert_eq!(hits.get(), 1);

        let reloaded = BadgeEngine::new(store, Fanout::new());
        assert!(reloaded.badges().has("first-prompt"));
        assert!(reloaded.badges().unlocked_at.contains_key("first-prompt"));
    }

    #[test]
    fn stale_engine_merges_foreign_unlocks_before_saving() {
        let store = Rc::new(Store::in_memory());
        let fanout = Fanout::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _s = fanout.subscribe(Topic::Badges, move |_| h.set(h.get() + 1));

        let mut tab_a = BadgeEngine::new(Rc::clone(&store), Fanout::new());
        let mut tab_b = BadgeEngine::new(Rc::clone(&store), fanout);

        tab_a.evaluate_unlocks(&progress(1), &UsageContext::default());
        let focus = UsageContext {
            completed_pomodoros: 1,
            ..Default::default()
        };
        let delta = tab_b.evaluate_unlocks(&UserProgress::new(), &focus);
        assert_eq!(delta, vec!["focus-1"]);

        let persisted = BadgeEngine::new(store, Fanout::new());
        assert!(persisted.badges().has("first-prompt"));
        assert!(persisted.badges().has("focus-1"));
        assert!(persisted.badges().unlocked_at.contains_key("first-prompt"));
        assert!(tab_b.badges().has("first-prompt"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn merged_foreign_unlock_is_published() {
        let store = Rc::new(Store::in_memory());
        let fanout = Fanout::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _s = fanout.subscribe(Topic::Badges, move |_| h.set(h.get() + 1));

        let mut tab_a = BadgeEngine::new(Rc::clone(&store), Fanout::new());
        let mut tab_b = BadgeEngine::new(store, fanout);
        tab_a.evaluate_unlocks(&progress(1), &UsageContext::default());

        assert!(tab_b
            .evaluate_unlocks(&UserProgress::new(), &UsageContext::default())
            .is_empty());
        assert!(tab_b.badges().has("first-prompt"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn statuses_cover_whole_catalog() {
        let mut e = engine();
        e.evaluate_unlocks(&progress(1), &UsageContext::default());
        let statuses = e.statuses();
        assert_eq!(statuses.len(), CATALOG.len());
        assert!(statuses[0].earned);
        assert!(statuses[0].unlocked_at.is_some());
        assert!(!statuses[1].earned);
        assert_eq!(e.locked().len(), CATALOG.len() - 1);
    }

    #[test]
    fn unknown_persisted_ids_are_kept_but_not_displayed() {
        let store = Rc::new(Store::in_memory());
        store
            .backend()
            .set(keys::BADGES, r#"{"earned":["retired-badge","first-prompt"]}"#)
            .unwrap();
        let e = BadgeEngine::new(store, Fanout::new());
        assert!(e.badges().has("retired-badge"));
        let shown: Vec<_> = e.earned_in_catalog_order().iter().map(|b| b.id).collect();
        assert_eq!(shown, vec!["first-prompt"]);
    }
}
