pub mod badges;
pub mod challenge;
pub mod config;
pub mod pomodoro;
pub mod progress;
pub mod stats;
pub mod watch;

use medprompts_core::{Config, MedPrompts, NotificationPermission, NotificationSink};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Prints phase notifications to stderr.
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn notify(&self, title: &str, body: &str) {
        eprintln!("🔔 {title}: {body}");
    }
}

/// Load config and every engine from the data directory.
pub fn open_app() -> Result<MedPrompts, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    Ok(MedPrompts::open(config, Box::new(TerminalSink))?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn reset(yes: bool) -> CliResult {
    if !yes {
        return Err("refusing to erase progress without --yes".into());
    }
    let mut app = open_app()?;
    app.reset_all();
    println!("{{\"type\": \"reset\"}}");
    Ok(())
}
