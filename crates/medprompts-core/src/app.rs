//! Explicit state holder wiring the engines together.
//!
//! Built once at process start with [`MedPrompts::init`] and passed by
//! reference to whatever displays state. Cross-engine flows (a prompt use
//! unlocking badges, a finished challenge awarding XP) live here.

use std::rc::Rc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::badges::{BadgeEngine, UsageContext, CATALOG};
use crate::challenge::{ChallengeEngine, WeeklyChallengeState};
use crate::error::Result;
use crate::events::Event;
use crate::fanout::{Fanout, Subscription, Topic};
use crate::pomodoro::{NotificationSink, PomodoroEngine, PomodoroMode, SilentSink};
use crate::progress::{ProgressEngine, PromptUse, UserProgress};
use crate::stats::{Dashboard, PomodoroStats};
use crate::storage::{keys, Config, Database, Store};

/// Result of recording a prompt use.
#[derive(Debug, Clone, Serialize)]
pub struct UsageOutcome {
    pub progress: UserProgress,
    pub leveled_up: bool,
    pub new_badges: Vec<String>,
}

/// Result of completing a challenge task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub state: WeeklyChallengeState,
    pub challenge_completed: bool,
    pub new_badges: Vec<String>,
}

/// Result of [`MedPrompts::poll`].
#[derive(Debug, Clone, Serialize)]
pub struct PollOutcome {
    /// Topics changed by other writers since the previous poll.
    pub changed: Vec<Topic>,
    pub event: Option<Event>,
}

pub struct MedPrompts {
    store: Rc<Store>,
    fanout: Fanout,
    config: Config,
    progress: ProgressEngine,
    badges: BadgeEngine,
    challenges: ChallengeEngine,
    pomodoro: PomodoroEngine,
}

impl MedPrompts {
    /// Load every engine from `store`.
    pub fn init(store: Store, config: Config, sink: Box<dyn NotificationSink>) -> Self {
        let store = Rc::new(store);
        let fanout = Fanout::new();
        let sink: Box<dyn NotificationSink> = if config.notifications.enabled {
            sink
        } else {
            Box::new(SilentSink)
        };
        let progress = ProgressEngine::new(
            Rc::clone(&store),
            fanout.clone(),
            config.gamification.xp_per_prompt,
        );
        let badges = BadgeEngine::new(Rc::clone(&store), fanout.clone());
        let challenges = ChallengeEngine::new(
            Rc::clone(&store),
            fanout.clone(),
            config.gamification.challenge_bonus_xp,
        );
        let pomodoro = PomodoroEngine::new(
            Rc::clone(&store),
            fanout.clone(),
            config.pomodoro.durations(),
            sink,
        );
        tracing::debug!(
            xp = progress.progress().xp,
            badges = badges.badges().earned.len(),
            "state loaded"
        );
        Self {
            store,
            fanout,
            config,
            progress,
            badges,
            challenges,
            pomodoro,
        }
    }

    /// Open the on-disk database in the data directory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(config: Config, sink: Box<dyn NotificationSink>) -> Result<Self> {
        let db = Database::open()?;
        Ok(Self::init(Store::new(db), config, sink))
    }

    /// Ephemeral instance with default configuration and no notifications.
    pub fn in_memory() -> Self {
        Self::init(Store::in_memory(), Config::default(), Box::new(SilentSink))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + 'static,
    {
        self.fanout.subscribe(topic, handler)
    }

    pub fn progress(&self) -> &ProgressEngine {
        &self.progress
    }

    pub fn badges(&self) -> &BadgeEngine {
        &self.badges
    }

    pub fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    pub fn pomodoro(&self) -> &PomodoroEngine {
        &self.pomodoro
    }

    // ── Flows ────────────────────────────────────────────────────────

    /// Record a prompt use now.
    pub fn record_prompt_usage(&mut self) -> UsageOutcome {
        self.record_prompt_usage_with(PromptUse::now())
    }

    pub fn record_prompt_usage_with(&mut self, usage: PromptUse) -> UsageOutcome {
        let before = self.progress.progress().level;
        let progress = self.progress.record_prompt_usage_with(&usage);
        let new_badges = self.evaluate_badges_at(Some(usage.at));
        UsageOutcome {
            leveled_up: progress.level > before,
            progress,
            new_badges,
        }
    }

    pub fn ensure_current_challenge(&mut self, today: NaiveDate) -> WeeklyChallengeState {
        self.challenges.ensure_current_challenge(today)
    }

    /// Complete a task of this week's challenge, rotating the challenge first
    /// if the week changed.
    pub fn complete_challenge_task(&mut self, task_id: &str) -> TaskOutcome {
        self.complete_challenge_task_on(task_id, Local::now().date_naive())
    }

    pub fn complete_challenge_task_on(&mut self, task_id: &str, today: NaiveDate) -> TaskOutcome {
        self.challenges.ensure_current_challenge(today);
        let was_completed = self.challenges.state().challenges_completed();
        let state = self.challenges.complete_task(task_id, &mut self.progress);
        let challenge_completed = state.challenges_completed() > was_completed;
        let new_badges = if challenge_completed {
            self.evaluate_badges_at(None)
        } else {
            Vec::new()
        };
        TaskOutcome {
            state,
            challenge_completed,
            new_badges,
        }
    }

    pub fn start_pomodoro(&mut self) -> Option<Event> {
        self.pomodoro.start()
    }

    pub fn pause_pomodoro(&mut self) -> Option<Event> {
        let event = self.pomodoro.pause();
        self.after_pomodoro(event)
    }

    pub fn reset_pomodoro(&mut self) -> Option<Event> {
        self.pomodoro.reset()
    }

    pub fn skip_pomodoro(&mut self) -> Option<Event> {
        self.pomodoro.skip()
    }

    pub fn tick_pomodoro(&mut self) -> Option<Event> {
        let event = self.pomodoro.tick();
        self.after_pomodoro(event)
    }

    /// Count the pomodoro down by an explicit amount.
    pub fn elapse_pomodoro(&mut self, elapsed_ms: u64) -> Option<Event> {
        let event = self.pomodoro.elapse(elapsed_ms);
        self.after_pomodoro(event)
    }

    fn after_pomodoro(&mut self, event: Option<Event>) -> Option<Event> {
        if let Some(Event::PhaseCompleted {
            from: PomodoroMode::Focus,
            ..
        }) = event
        {
            self.evaluate_badges_at(None);
        }
        event
    }

    /// Re-check every badge against current state.
    pub fn evaluate_badges(&mut self) -> Vec<String> {
        self.evaluate_badges_at(None)
    }

    fn evaluate_badges_at(&mut self, prompt_used_at: Option<NaiveDateTime>) -> Vec<String> {
        let usage = self.usage_context(prompt_used_at);
        self.badges.evaluate_unlocks(self.progress.progress(), &usage)
    }

    fn usage_context(&self, prompt_used_at: Option<NaiveDateTime>) -> UsageContext {
        UsageContext {
            prompt_used_at,
            completed_pomodoros: self.completed_focus_sessions(),
            challenges_completed: self.challenges.state().challenges_completed(),
        }
    }

    fn completed_focus_sessions(&self) -> u64 {
        self.pomodoro
            .history()
            .iter()
            .filter(|r| r.completed && r.mode == PomodoroMode::Focus)
            .count() as u64
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn pomodoro_stats(&self, today: NaiveDate) -> PomodoroStats {
        PomodoroStats::compute(self.pomodoro.history(), today, &Local)
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        let progress = self.progress.progress();
        let challenge_state = self.challenges.state();
        Dashboard {
            xp: progress.xp,
            level: self.progress.level_summary(),
            streak: self.progress.current_streak(today),
            longest_streak: progress.longest_streak,
            total_prompts_used: progress.total_prompts_used,
            categories_explored: progress.categories_explored(),
            badges_earned: self.badges.earned_in_catalog_order().len(),
            badges_total: CATALOG.len(),
            challenge: challenge_state.view(),
            challenges_completed: challenge_state.challenges_completed(),
            pomodoro: self.pomodoro_stats(today),
        }
    }

    // ── Synchronization ──────────────────────────────────────────────

    /// Re-read every document from the store and publish the topics whose
    /// state changed underneath us (another process, another window).
    ///
    /// Polling this is a safety net; in-process changes are already
    /// published by the engines themselves.
    pub fn refresh(&mut self) -> Vec<Topic> {
        let mut changed = Vec::new();

        let before = self.progress.progress().clone();
        if self.progress.load_progress() != before {
            changed.push(Topic::Progress);
        }
        let before = self.badges.badges().clone();
        if self.badges.load_user_badges() != before {
            changed.push(Topic::Badges);
        }
        let before = self.challenges.state().clone();
        if self.challenges.load_weekly_challenge_state() != before {
            changed.push(Topic::Challenge);
        }
        let before = (self.pomodoro.timer().clone(), self.pomodoro.history().len());
        self.pomodoro.load_history();
        if (self.pomodoro.timer().clone(), self.pomodoro.history().len()) != before {
            changed.push(Topic::Pomodoro);
        }

        for topic in &changed {
            tracing::debug!(%topic, "external change detected");
            self.fanout.publish(*topic);
        }
        changed
    }

    /// One step of a long-running session: pick up foreign writes, then
    /// advance the countdown from the fresh timer.
    ///
    /// Ticking first would save a stale timer over whatever another process
    /// wrote since the last poll.
    pub fn poll(&mut self) -> PollOutcome {
        let changed = self.refresh();
        let event = self.tick_pomodoro();
        PollOutcome { changed, event }
    }

    /// Wipe every persisted document and start over.
    pub fn reset_all(&mut self) {
        for key in keys::ALL {
            self.store.clear(key);
        }
        self.progress.reset();
        self.badges.reset();
        self.challenges.reset();
        self.pomodoro.clear();
        tracing::info!("all progress cleared");
    }
}
