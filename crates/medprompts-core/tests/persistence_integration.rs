//! Integration tests for persisted gamification state.
//!
//! Runs the engines against an on-disk SQLite file, reopening it the way
//! separate CLI invocations or browser tabs would.

use chrono::NaiveDate;
use medprompts_core::pomodoro::RecordingSink;
use medprompts_core::storage::keys;
use medprompts_core::{Config, Database, Event, MedPrompts, PromptUse, SilentSink, Store, Topic};
use std::path::Path;
use std::rc::Rc;

fn open(path: &Path) -> MedPrompts {
    let db = Database::open_at(path).unwrap();
    MedPrompts::init(Store::new(db), Config::default(), Box::new(SilentSink))
}

fn use_on(day: u32) -> PromptUse {
    PromptUse::at(
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap(),
    )
}

#[test]
fn fresh_state_then_one_prompt_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");

    open(&path).record_prompt_usage_with(use_on(19));

    let mut app = open(&path);
    let p = app.progress().progress().clone();
    assert_eq!(p.xp, 10);
    assert_eq!(p.total_prompts_used, 1);
    assert_eq!(p.streak, 1);
    assert_eq!(p.level, 1);
    assert!(app.badges().badges().has("first-prompt"));
    assert!(app.refresh().is_empty());
}

#[test]
fn streak_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");

    for day in 13..=19 {
        let usage = use_on(day).with_category(format!("specialty-{day}"));
        open(&path).record_prompt_usage_with(usage);
    }

    let app = open(&path);
    let p = app.progress().progress();
    assert_eq!(p.streak, 7);
    assert_eq!(p.total_prompts_used, 7);
    assert_eq!(p.categories_explored(), 7);
    for badge in ["streak-3", "streak-7", "explorer"] {
        assert!(app.badges().badges().has(badge), "missing {badge}");
    }

    // Two idle days, then a new run starts at 1.
    let mut app = open(&path);
    let outcome = app.record_prompt_usage_with(use_on(22));
    assert_eq!(outcome.progress.streak, 1);
    assert_eq!(outcome.progress.longest_streak, 7);
    assert!(app.badges().badges().has("streak-7"));
}

#[test]
fn second_instance_sees_changes_on_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");

    let mut watcher = open(&path);
    let mut writer = open(&path);

    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let subs: Vec<_> = Topic::ALL
        .iter()
        .map(|t| {
            let seen = Rc::clone(&seen);
            watcher.subscribe(*t, move |topic| seen.borrow_mut().push(topic))
        })
        .collect();

    writer.record_prompt_usage_with(use_on(19));
    writer.skip_pomodoro();
    assert!(seen.borrow().is_empty());

    let changed = watcher.refresh();
    assert_eq!(changed, vec![Topic::Progress, Topic::Badges, Topic::Pomodoro]);
    assert_eq!(*seen.borrow(), changed);
    assert_eq!(watcher.progress().progress().xp, 10);
    assert_eq!(watcher.pomodoro().history().len(), 1);

    for sub in subs {
        sub.unsubscribe();
    }
}

#[test]
fn polling_instance_keeps_foreign_pause() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");

    let mut watcher = open(&path);
    watcher.start_pomodoro();
    assert!(watcher.poll().changed.is_empty());

    let mut other = open(&path);
    assert!(other.pomodoro().is_running());
    other.pause_pomodoro();

    let outcome = watcher.poll();
    assert_eq!(outcome.changed, vec![Topic::Pomodoro]);
    assert!(outcome.event.is_none());
    assert!(!watcher.pomodoro().is_running());

    // Further polls leave the paused timer alone.
    watcher.poll();
    assert!(!open(&path).pomodoro().is_running());
}

#[test]
fn stale_instance_keeps_badges_earned_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");

    let mut tab_a = open(&path);
    let mut tab_b = open(&path);

    tab_a.record_prompt_usage_with(use_on(19));
    tab_b.start_pomodoro();
    let remaining = tab_b.pomodoro().remaining_ms();
    tab_b.elapse_pomodoro(remaining);

    let reopened = open(&path);
    for badge in ["first-prompt", "focus-1"] {
        assert!(reopened.badges().badges().has(badge), "missing {badge}");
    }
}

#[test]
fn weekly_challenge_rotation_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let state = open(&path).ensure_current_challenge(monday);
    let tasks: Vec<String> = state
        .current
        .as_ref()
        .unwrap()
        .tasks
        .iter()
        .map(|t| t.id.clone())
        .collect();

    for task in &tasks {
        open(&path).complete_challenge_task_on(task, monday);
    }
    let app = open(&path);
    assert_eq!(app.progress().progress().xp, 100);
    assert!(app.badges().badges().has("challenge-1"));

    let next_week = monday + chrono::Duration::days(7);
    let mut app = open(&path);
    let rotated = app.ensure_current_challenge(next_week);
    assert_eq!(rotated.history.len(), 1);
    assert!(rotated.history[0].completed);
    assert_eq!(rotated.challenges_completed(), 1);
    assert!(!rotated.current.unwrap().is_completed());
}

#[test]
fn corrupt_documents_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medprompts.db");
    {
        let db = Database::open_at(&path).unwrap();
        for key in keys::ALL {
            db.kv_set(key, "{{{ definitely not json").unwrap();
        }
    }

    let mut app = open(&path);
    assert_eq!(app.progress().progress().xp, 0);
    assert!(app.badges().badges().earned.is_empty());
    assert!(app.challenges().state().current.is_none());
    assert!(app.pomodoro().history().is_empty());

    // The first write replaces the corrupt document.
    app.record_prompt_usage_with(use_on(19));
    assert_eq!(open(&path).progress().progress().xp, 10);
}

#[test]
fn pomodoro_cycle_with_notifications() {
    let sink = Rc::new(RecordingSink::default());
    let mut app = MedPrompts::init(
        Store::in_memory(),
        Config::default(),
        Box::new(Rc::clone(&sink)),
    );

    let mut long_breaks = 0;
    for _ in 0..8 {
        app.start_pomodoro();
        let remaining = app.pomodoro().remaining_ms();
        match app.elapse_pomodoro(remaining) {
            Some(Event::PhaseCompleted { to, .. }) => {
                if to == medprompts_core::PomodoroMode::LongBreak {
                    long_breaks += 1;
                }
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }
    // 8 phases = 4 focus + 4 breaks, the 4th focus leads to a long break.
    assert_eq!(long_breaks, 1);
    assert_eq!(sink.sent.borrow().len(), 8);
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    assert_eq!(app.pomodoro_stats(today).completed_pomodoros, 4);
    assert!(app.badges().badges().has("focus-1"));
}
