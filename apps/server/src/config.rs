//! Application configuration.

use cryptowatch_core::DEFAULT_ASSETS;
use cryptowatch_engine::{SchedulerConfig, DEFAULT_NOTIFICATION_BUFFER};
use cryptowatch_feeds::CoinGeckoFetcher;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Refresh configuration.
    pub refresh: RefreshSettings,
    /// Price provider configuration.
    pub provider: ProviderSettings,
    /// HTTP server configuration.
    pub server: ServerSettings,
    /// Logging level.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshSettings::default(),
            provider: ProviderSettings::default(),
            server: ServerSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. Returns `None` when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(Some(config))
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh.interval_secs < 1 {
            return Err(ConfigError::Invalid {
                field: "refresh.interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.provider.timeout_secs < 1 {
            return Err(ConfigError::Invalid {
                field: "provider.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.refresh.assets.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "refresh.assets",
                reason: "must list at least one asset".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&self.provider.base_url) {
            return Err(ConfigError::Invalid {
                field: "provider.base_url",
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    /// Non-empty asset ids, trimmed.
    pub fn asset_ids(&self) -> Vec<String> {
        self.refresh
            .assets
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.refresh.interval_secs),
            asset_ids: self.asset_ids(),
        }
    }
}

/// Refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Seconds between scheduled refreshes.
    pub interval_secs: u64,
    /// Asset identifiers to monitor.
    pub assets: Vec<String>,
    /// Where prices come from.
    pub source: SourceKind,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            source: SourceKind::Live,
        }
    }
}

/// Price source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// CoinGecko REST API.
    #[default]
    Live,
    /// Random-walk simulator.
    Simulated,
}

/// Price provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: CoinGeckoFetcher::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    /// Notification channel capacity per session.
    pub notification_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 9001,
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.refresh.assets.len(), 5);
        assert_eq!(config.refresh.source, SourceKind::Live);
        assert_eq!(config.provider.base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.server.port, 9001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config: AppConfig =
            serde_json::from_str(r#"{"refresh": {"source": "simulated"}, "server": {"port": 8080}}"#)
                .unwrap();
        assert_eq!(config.refresh.source, SourceKind::Simulated);
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.notification_buffer, 256);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = AppConfig::default();
        config.refresh.interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "refresh.interval_secs", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_assets() {
        let mut config = AppConfig::default();
        config.refresh.assets = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.provider.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "provider.base_url", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load("/nonexistent/cryptowatch.json")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("cryptowatch-load-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"refresh": {"interval_secs": 30}}"#).unwrap();
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(result.unwrap().unwrap().refresh.interval_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.provider.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "provider.timeout_secs", .. })
        ));
    }

    #[test]
    fn test_load_invalid_json() {
        let path = std::env::temp_dir().join(format!("cryptowatch-test-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_scheduler_config_trims_assets() {
        let mut config = AppConfig::default();
        config.refresh.assets = vec![" bitcoin ".to_string(), "".to_string()];
        config.refresh.interval_secs = 5;
        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.asset_ids, vec!["bitcoin"]);
        assert_eq!(scheduler.interval, Duration::from_secs(5));
    }
}
