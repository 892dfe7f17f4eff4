use chrono::Local;
use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Progress, badges, challenge and pomodoro numbers in one document
    Dashboard,
    /// Pomodoro statistics only
    Pomodoro,
}

pub fn run(action: StatsAction) -> CliResult {
    let app = open_app()?;
    let today = Local::now().date_naive();

    match action {
        StatsAction::Dashboard => print_json(&app.dashboard(today))?,
        StatsAction::Pomodoro => print_json(&app.pomodoro_stats(today))?,
    }
    Ok(())
}
