use std::{fs, path::Path, time::Duration};

use client_core::{
    transport::DEFAULT_CSRF_COOKIE, ControllerSettings, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_SUCCESS_DELAY,
};
use tracing::warn;

pub const SETTINGS_FILE: &str = "storyboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub csrf_cookie_name: String,
    pub csrf_token: Option<String>,
    pub progress_interval_ms: u64,
    pub success_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.into(),
            csrf_token: None,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL.as_millis() as u64,
            success_delay_ms: DEFAULT_SUCCESS_DELAY.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            success_delay: Duration::from_millis(self.success_delay_ms),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file, then environment variables. Every key
/// is read as `STORYBOARD_<KEY>` or `APP__<KEY>`; the `APP__` form wins.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match raw.parse::<toml::Table>() {
            Ok(table) => apply_file(&mut settings, &table),
            Err(err) => warn!(
                path = %path.display(),
                error = %err,
                "config: ignoring unparsable settings file"
            ),
        }
    }

    let lookup = |key: &str| {
        env(&format!("APP__{key}")).or_else(|| env(&format!("STORYBOARD_{key}")))
    };

    if let Some(v) = lookup("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("CSRF_COOKIE_NAME") {
        settings.csrf_cookie_name = v;
    }
    if let Some(v) = lookup("CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Some(parsed) = lookup("PROGRESS_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.progress_interval_ms = parsed;
    }
    if let Some(parsed) = lookup("SUCCESS_DELAY_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.success_delay_ms = parsed;
    }

    settings
}

fn apply_file(settings: &mut Settings, table: &toml::Table) {
    if let Some(v) = table.get("server_url").and_then(|v| v.as_str()) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = table.get("csrf_cookie_name").and_then(|v| v.as_str()) {
        settings.csrf_cookie_name = v.to_string();
    }
    if let Some(v) = table.get("csrf_token").and_then(|v| v.as_str()) {
        settings.csrf_token = Some(v.to_string());
    }
    if let Some(v) = table
        .get("progress_interval_ms")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.progress_interval_ms = v;
    }
    if let Some(v) = table
        .get("success_delay_ms")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.success_delay_ms = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
