use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CLIENT_ID_ENV: &str = "IMGUR_CLIENT_ID";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    #[serde(default = "default_watch_folder")]
    pub watch_folder: PathBuf,

    #[serde(default = "default_enabled")]
    pub enable_menu: bool,

    #[serde(default = "default_enabled")]
    pub enable_watcher: bool,
}

fn default_client_id() -> String {
    "your_client_id_here".to_string()
}

fn default_upload_url() -> String {
    "https://api.imgur.com/3/upload".to_string()
}

fn default_watch_folder() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            upload_url: default_upload_url(),
            watch_folder: default_watch_folder(),
            enable_menu: true,
            enable_watcher: true,
        }
    }
}

impl Config {
    /// The environment variable wins over the config file.
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
            if !id.is_empty() {
                self.client_id = id;
            }
        }
    }
}

pub fn parse(content: &str) -> Result<Config> {
    toml::from_str::<Config>(content).context("Error during parse")
}

pub fn parse_file(name: &str) -> Result<Config> {
    let contents = std::fs::read_to_string(name).context("Failed to read config file")?;

    parse(&contents)
}

/// Look for the configuration file in common directories and stop when
/// finding the first. A missing file is not an error: every field has a
/// default.
pub fn find_parse_config() -> Config {
    // Search in different order depending on the OS
    // Linux/Mac: working directory, XDG_CONFIG_HOME, $HOME/.config
    // Windows: working directory, %USERPROFILE%\.config

    let mut paths = vec!["imgup.toml".to_string(), "../imgup.toml".to_string()];

    #[cfg(target_os = "windows")]
    {
        if let Some(home) = std::env::var_os("USERPROFILE") {
            if let Ok(home) = home.into_string() {
                paths.push(home + "/.config/imgup.toml");
            }
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home) = std::env::var_os("XDG_CONFIG_HOME") {
            if let Ok(home) = home.into_string() {
                paths.push(home + "/imgup.toml");
            }
        }

        if let Some(home) = std::env::var_os("HOME") {
            if let Ok(home) = home.into_string() {
                paths.push(home + "/.config/imgup.toml");
            }
        }
    }

    let mut found = None;
    for path in &paths {
        log::debug!("Trying to parse config file {}", path);

        match parse_file(path) {
            Ok(config) => {
                found = Some(config);
                break;
            }
            Err(e) => {
                // Only log if the file exists
                if std::path::Path::new(&path).exists() {
                    log::warn!("Failed to parse config file {}: {}", path, e);
                }
            }
        }
    }

    let mut config = found.unwrap_or_default();
    config.apply_env();
    config
}
