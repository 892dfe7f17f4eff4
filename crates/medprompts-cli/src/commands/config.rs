use clap::Subcommand;
use medprompts_core::Config;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole configuration as JSON
    Show,
    /// Print one value by dot-separated key, e.g. `pomodoro.focus_minutes`
    Get { key: String },
    /// Set one value by dot-separated key and save
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> CliResult {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => print_json(&config)?,
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown config key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}
