use chrono::Local;
use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Print this week's challenge, generating it if needed
    Show,
    /// Mark a task of this week's challenge as done
    Complete {
        /// Task identifier
        task_id: String,
    },
    /// Print archived challenges
    History,
}

pub fn run(action: ChallengeAction) -> CliResult {
    let mut app = open_app()?;
    let today = Local::now().date_naive();

    match action {
        ChallengeAction::Show => {
            let state = app.ensure_current_challenge(today);
            print_json(&state.current)?;
        }
        ChallengeAction::Complete { task_id } => {
            let outcome = app.complete_challenge_task_on(&task_id, today);
            if outcome.challenge_completed {
                eprintln!("🎉 weekly challenge completed");
            }
            print_json(&outcome)?;
        }
        ChallengeAction::History => {
            print_json(&app.challenges().state().history)?;
        }
    }
    Ok(())
}
