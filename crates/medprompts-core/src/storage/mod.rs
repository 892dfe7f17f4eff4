mod config;
pub mod database;
pub mod store;

pub use config::{Config, GamificationConfig, NotificationsConfig, PomodoroConfig, SyncConfig};
pub use database::Database;
pub use store::{keys, KvBackend, MemoryBackend, Store};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MEDPROMPTS_HOME` wins when set. Otherwise `~/.config/medprompts[-dev]/`
/// based on `MEDPROMPTS_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MEDPROMPTS_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MEDPROMPTS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("medprompts-dev")
            } else {
                base_dir.join("medprompts")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
