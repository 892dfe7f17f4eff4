use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restore the current mode's full duration
    Reset,
    /// Jump to the next phase
    Skip,
    /// Print current timer state as JSON
    Status,
    /// Print the session history as JSON
    History,
}

pub fn run(action: PomodoroAction) -> CliResult {
    let mut app = open_app()?;

    // Account for time that passed since the last invocation.
    let completed = app.tick_pomodoro();
    if let Some(event) = &completed {
        print_json(event)?;
    }

    match action {
        PomodoroAction::Start => match app.start_pomodoro() {
            Some(event) => print_json(&event)?,
            None => print_json(&app.pomodoro().snapshot())?,
        },
        PomodoroAction::Pause => match app.pause_pomodoro() {
            Some(event) => print_json(&event)?,
            None => print_json(&app.pomodoro().snapshot())?,
        },
        PomodoroAction::Reset => {
            if let Some(event) = app.reset_pomodoro() {
                print_json(&event)?;
            }
        }
        PomodoroAction::Skip => {
            if let Some(event) = app.skip_pomodoro() {
                print_json(&event)?;
            }
        }
        PomodoroAction::Status => print_json(&app.pomodoro().snapshot())?,
        PomodoroAction::History => print_json(app.pomodoro().history())?,
    }
    Ok(())
}
