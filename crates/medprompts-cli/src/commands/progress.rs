use chrono::Local;
use clap::Subcommand;
use medprompts_core::PromptUse;
use serde::Serialize;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print XP, level and streak as JSON
    Show,
    /// Record the use of a prompt
    Use {
        /// Prompt identifier
        #[arg(long)]
        prompt: Option<String>,
        /// Library category (specialty) of the prompt
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Serialize)]
struct ProgressView<'a> {
    #[serde(flatten)]
    progress: &'a medprompts_core::UserProgress,
    current_streak: u32,
    level_info: medprompts_core::progress::LevelSummary,
}

pub fn run(action: ProgressAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        ProgressAction::Show => {
            let today = Local::now().date_naive();
            let engine = app.progress();
            print_json(&ProgressView {
                progress: engine.progress(),
                current_streak: engine.current_streak(today),
                level_info: engine.level_summary(),
            })?;
        }
        ProgressAction::Use { prompt, category } => {
            let mut usage = PromptUse::now();
            if let Some(prompt) = prompt {
                usage = usage.with_prompt(prompt);
            }
            if let Some(category) = category {
                usage = usage.with_category(category);
            }
            let outcome = app.record_prompt_usage_with(usage);
            for badge in &outcome.new_badges {
                eprintln!("🏅 badge unlocked: {badge}");
            }
            print_json(&outcome)?;
        }
    }
    Ok(())
}
