use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

const CONFIG_FILE_NAME: &str = "counter.toml";
const DATABASE_FILE_NAME: &str = "app.db";

/// Environment variables consulted by [`load_settings`], lowest priority first.
pub const DATABASE_URL_ENV_VARS: [&str; 2] = ["COUNTER_DATABASE_URL", "APP__DATABASE_URL"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/app.db".into(),
        }
    }
}

impl Settings {
    /// Counter database inside an application data directory.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            database_url: sqlite_url_for_path(&data_dir.join(DATABASE_FILE_NAME)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
}

/// Defaults, then `counter.toml` in `config_dir`, then environment.
pub fn load_settings(base: Settings, config_dir: &Path) -> Settings {
    let settings = apply_config_file(base, config_dir);
    apply_env_overrides(settings, |name| std::env::var(name).ok())
}

fn apply_config_file(mut settings: Settings, config_dir: &Path) -> Settings {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let Ok(raw) = fs::read_to_string(&config_path) else {
        return settings;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(FileSettings {
            database_url: Some(url),
        }) => settings.database_url = url,
        Ok(_) => {}
        Err(err) => warn!(
            path = %config_path.display(),
            "ignoring unreadable counter config: {err}"
        ),
    }
    settings
}

/// Later variables in [`DATABASE_URL_ENV_VARS`] win over earlier ones.
pub fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    for name in DATABASE_URL_ENV_VARS {
        if let Some(url) = lookup(name) {
            settings.database_url = url;
        }
    }
    settings
}

/// Turns a configured value into a URL sqlx accepts. Bare paths and
/// `sqlite:<path>` become `sqlite://<path>`; blank falls back to the default.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().database_url;
    }
    if raw.starts_with("sqlite::memory:") || raw.contains("://") {
        return raw.to_string();
    }
    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn sqlite_url_for_path(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
