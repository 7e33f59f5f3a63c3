use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_PROCESS_NAME: &str = "WorldOfWarships64.exe";
pub const DEFAULT_MATCH_FILE_NAME: &str = "tempArenaInfo.json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
/// Discord application id registered for this daemon.
pub const DEFAULT_DISCORD_APP_ID: i64 = 945_234_903_392_481_330;

/// Daemon configuration. Deserialized from %APPDATA%\WowsPresence\config.toml;
/// every field has a default so an empty or absent file yields a working setup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Executable filename polled for in the process list.
    #[serde(default = "default_process_name")]
    pub process_name: String,
    /// File inside the replays directory that describes the active battle.
    #[serde(default = "default_match_file_name")]
    pub match_file_name: String,
    /// Process poll interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Discord application id used for the rich-presence session.
    #[serde(default = "default_discord_app_id")]
    pub discord_app_id: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            match_file_name: DEFAULT_MATCH_FILE_NAME.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            discord_app_id: DEFAULT_DISCORD_APP_ID,
        }
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_process_name() -> String {
    DEFAULT_PROCESS_NAME.to_string()
}

fn default_match_file_name() -> String {
    DEFAULT_MATCH_FILE_NAME.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_discord_app_id() -> i64 {
    DEFAULT_DISCORD_APP_ID
}
