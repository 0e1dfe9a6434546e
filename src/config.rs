use crate::app::ControllerSettings;
use crate::data::fetch::DEFAULT_API_BASE_URL;
use crate::ui::Timeframe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeframe: Timeframe,
    pub last_exchange: Option<String>,
    pub poll_interval_secs: u64,
    pub error_display_secs: u64,
    pub request_timeout_secs: u64,
    pub dark: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeframe: Timeframe::default(),
            last_exchange: None,
            poll_interval_secs: 30,
            error_display_secs: 5,
            request_timeout_secs: 20,
            dark: false,
        }
    }
}

impl AppConfig {
    pub fn sanitized(mut self) -> Self {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        }
        if self.last_exchange.as_deref().is_some_and(|id| id.trim().is_empty()) {
            self.last_exchange = None;
        }

        self.poll_interval_secs = self.poll_interval_secs.clamp(5, 3600);
        self.error_display_secs = self.error_display_secs.clamp(1, 60);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 300);
        self
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            error_display: Duration::from_secs(self.error_display_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".klineview.json")
}

pub fn load_config(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return AppConfig::default(),
    };

    match serde_json::from_str::<AppConfig>(&contents) {
        Ok(cfg) => cfg.sanitized(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    let payload = serde_json::to_string_pretty(config)?;
    std::fs::write(path, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"timeframe":"4h","dark":true}"#).unwrap();
        let cfg = cfg.sanitized();
        assert_eq!(cfg.timeframe, Timeframe::FourHours);
        assert!(cfg.dark);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.controller_settings().poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn empty_file_defaults_to_one_hour() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.timeframe, Timeframe::OneHour);
        assert_eq!(cfg.timeframe.as_str(), "1h");
    }

    #[test]
    fn sanitize_clamps_and_repairs() {
        let cfg = AppConfig {
            api_base_url: "localhost:8000".to_string(),
            last_exchange: Some("  ".to_string()),
            poll_interval_secs: 0,
            error_display_secs: 500,
            request_timeout_secs: 0,
            ..AppConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.last_exchange, None);
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.error_display_secs, 60);
        assert_eq!(cfg.request_timeout_secs, 1);
    }

    #[test]
    fn round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!("klineview-test-{}.json", std::process::id()));
        let cfg = AppConfig {
            last_exchange: Some("kucoin".to_string()),
            timeframe: Timeframe::OneDay,
            ..AppConfig::default()
        };
        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(&path), cfg);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_or_garbage_file_gives_defaults() {
        let path = std::env::temp_dir().join("klineview-does-not-exist.json");
        assert_eq!(load_config(&path), AppConfig::default());

        let garbage = std::env::temp_dir().join(format!("klineview-garbage-{}.json", std::process::id()));
        std::fs::write(&garbage, "not json").unwrap();
        assert_eq!(load_config(&garbage), AppConfig::default());
        std::fs::remove_file(&garbage).unwrap();
    }
}
