//! Settings for the terminal client: defaults, then `converter.toml`, then
//! environment overrides.

use std::{fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub theme_file: PathBuf,
    pub history_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            theme_file: default_theme_file(),
            history_limit: 10,
        }
    }
}

fn default_theme_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("php2node")
        .join("theme.json")
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    theme_file: Option<PathBuf>,
    history_limit: Option<u32>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("converter.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            if let Some(v) = file_cfg.server_url {
                settings.server_url = v;
            }
            if let Some(v) = file_cfg.theme_file {
                settings.theme_file = v;
            }
            if let Some(v) = file_cfg.history_limit {
                settings.history_limit = v;
            }
        }
    }

    if let Ok(v) = std::env::var("CONVERTER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__THEME_FILE") {
        settings.theme_file = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("APP__HISTORY_LIMIT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.history_limit = parsed;
        }
    }

    settings
}
