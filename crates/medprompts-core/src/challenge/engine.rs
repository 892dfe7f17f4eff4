//! Weekly challenge engine.
//!
//! One challenge per ISO week. Crossing into a new week archives the old
//! challenge and generates the next one from the template pool.

use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::templates::template_for;
use super::week::WeekId;
use crate::fanout::{Fanout, Topic};
use crate::progress::ProgressEngine;
use crate::storage::{keys, Store};

/// Archived challenges kept in history.
pub const HISTORY_LIMIT: usize = 52;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTask {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tasks: Vec<ChallengeTask>,
    pub week: WeekId,
    pub bonus_xp: u64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WeeklyChallenge {
    pub fn generate(week: WeekId, bonus_xp: u64) -> Self {
        let template = template_for(week);
        Self {
            id: format!("{week}-{}", template.id),
            title: template.title.to_string(),
            description: template.description.to_string(),
            tasks: template
                .tasks
                .iter()
                .map(|(id, description)| ChallengeTask {
                    id: id.to_string(),
                    description: description.to_string(),
                    completed: false,
                })
                .collect(),
            week,
            bonus_xp,
            completed_at: None,
        }
    }

    pub fn tasks_done(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn all_tasks_done(&self) -> bool {
        self.tasks.iter().all(|t| t.completed)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn progress_pct(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        (self.tasks_done() * 100 / self.tasks.len()) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedChallenge {
    pub id: String,
    pub title: String,
    pub week: WeekId,
    pub tasks_done: usize,
    pub tasks_total: usize,
    pub completed: bool,
}

impl From<&WeeklyChallenge> for ArchivedChallenge {
    fn from(c: &WeeklyChallenge) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            week: c.week,
            tasks_done: c.tasks_done(),
            tasks_total: c.tasks.len(),
            completed: c.is_completed(),
        }
    }
}

/// Persisted weekly challenge document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyChallengeState {
    #[serde(default)]
    pub current: Option<WeeklyChallenge>,
    #[serde(default)]
    pub history: Vec<ArchivedChallenge>,
}

impl WeeklyChallengeState {
    /// Completed challenges, archived and current.
    pub fn challenges_completed(&self) -> u32 {
        let archived = self.history.iter().filter(|c| c.completed).count();
        let current = self.current.as_ref().map_or(0, |c| c.is_completed() as usize);
        (archived + current) as u32
    }

    pub fn view(&self) -> ChallengeView {
        match &self.current {
            None => ChallengeView::None,
            Some(c) => ChallengeView::Active {
                id: c.id.clone(),
                title: c.title.clone(),
                week: c.week,
                tasks_done: c.tasks_done(),
                tasks_total: c.tasks.len(),
                progress_pct: c.progress_pct(),
                completed: c.is_completed(),
            },
        }
    }
}

/// Read model for display. `None` is a normal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChallengeView {
    None,
    Active {
        id: String,
        title: String,
        week: WeekId,
        tasks_done: usize,
        tasks_total: usize,
        progress_pct: u8,
        completed: bool,
    },
}

/// Sole writer of the `weekly-challenge-state` document.
pub struct ChallengeEngine {
    store: Rc<Store>,
    fanout: Fanout,
    bonus_xp: u64,
    state: WeeklyChallengeState,
}

impl ChallengeEngine {
    pub fn new(store: Rc<Store>, fanout: Fanout, bonus_xp: u64) -> Self {
        let state = store.load(keys::WEEKLY_CHALLENGE, WeeklyChallengeState::default());
        Self {
            store,
            fanout,
            bonus_xp,
            state,
        }
    }

    /// Re-read the persisted document, replacing the in-memory copy.
    pub fn load_weekly_challenge_state(&mut self) -> WeeklyChallengeState {
        self.state = self
            .store
            .load(keys::WEEKLY_CHALLENGE, WeeklyChallengeState::default());
        self.state.clone()
    }

    pub fn state(&self) -> &WeeklyChallengeState {
        &self.state
    }

    /// Make sure the active challenge belongs to the week containing `today`.
    pub fn ensure_current_challenge(&mut self, today: NaiveDate) -> WeeklyChallengeState {
        let week = WeekId::of(today);
        if let Some(current) = &self.state.current {
            if current.week >= week {
                if current.week > week {
                    tracing::debug!(
                        current = %current.week,
                        requested = %week,
                        "ignoring earlier week"
                    );
                }
                return self.state.clone();
            }
        }

        if let Some(old) = self.state.current.take() {
            tracing::info!(
                challenge = %old.id,
                completed = old.is_completed(),
                "archiving weekly challenge"
            );
            self.state.history.push(ArchivedChallenge::from(&old));
            let overflow = self.state.history.len().saturating_sub(HISTORY_LIMIT);
            self.state.history.drain(..overflow);
        }

        let next = WeeklyChallenge::generate(week, self.bonus_xp);
        tracing::info!(challenge = %next.id, tasks = next.tasks.len(), "new weekly challenge");
        self.state.current = Some(next);
        self.commit();
        self.state.clone()
    }

    /// Mark a task done. Unknown ids, a missing challenge and already
    /// completed tasks are no-ops. Finishing the last task awards the bonus
    /// through `progress`, once.
    pub fn complete_task(
        &mut self,
        task_id: &str,
        progress: &mut ProgressEngine,
    ) -> WeeklyChallengeState {
        let Some(challenge) = self.state.current.as_mut() else {
            tracing::debug!(task_id, "no active challenge");
            return self.state.clone();
        };
        let Some(task) = challenge.tasks.iter_mut().find(|t| t.id == task_id) else {
            tracing::debug!(task_id, challenge = %challenge.id, "unknown challenge task");
            return self.state.clone();
        };
        if task.completed {
            return self.state.clone();
        }
        task.completed = true;

        let bonus = if challenge.all_tasks_done() && !challenge.is_completed() {
            challenge.completed_at = Some(Utc::now());
            tracing::info!(
                challenge = %challenge.id,
                bonus_xp = challenge.bonus_xp,
                "weekly challenge completed"
            );
            Some(challenge.bonus_xp)
        } else {
            None
        };

        self.commit();
        if let Some(xp) = bonus {
            progress.award_bonus_xp(xp, "weekly challenge");
        }
        self.state.clone()
    }

    /// Drop the active challenge and its history.
    pub fn reset(&mut self) {
        self.state = WeeklyChallengeState::default();
        self.commit();
    }

    fn commit(&mut self) {
        self.store.save(keys::WEEKLY_CHALLENGE, &self.state);
        self.fanout.publish(Topic::Challenge);
    }
}
