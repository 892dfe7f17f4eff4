use clap::Subcommand;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List the catalog with unlock state
    List {
        /// Only show earned badges
        #[arg(long)]
        earned: bool,
    },
    /// Re-check every badge against current state
    Check,
}

pub fn run(action: BadgesAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        BadgesAction::List { earned } => {
            let statuses: Vec<_> = app
                .badges()
                .statuses()
                .into_iter()
                .filter(|s| !earned || s.earned)
                .collect();
            print_json(&statuses)?;
        }
        BadgesAction::Check => {
            let unlocked = app.evaluate_badges();
            print_json(&unlocked)?;
        }
    }
    Ok(())
}
