use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tally_http::client::{ClientConfig, RetryConfig};
use tally_http::{TallyClient, TallyError};
use tokio::fs;

pub const BASE_URL_ENV: &str = "TALLY_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_initial_fetch_timeout_ms")]
    pub initial_fetch_timeout_ms: u64,
    #[serde(default = "default_vote_timeout_ms")]
    pub vote_timeout_ms: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Consecutive stream failures still reported as degraded.
    #[serde(default = "default_degraded_threshold")]
    pub degraded_threshold: u32,
    #[serde(default = "default_health_poll_interval_ms")]
    pub health_poll_interval_ms: u64,
    /// Conference id overriding the one reported by `/version`.
    #[serde(default)]
    pub conference: Option<String>,
    /// Partner referral code attached to votes.
    #[serde(default)]
    pub referral: Option<String>,
    #[serde(default)]
    pub log_requests: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_initial_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_vote_timeout_ms() -> u64 {
    20_000
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_degraded_threshold() -> u32 {
    3
}

fn default_health_poll_interval_ms() -> u64 {
    2_000
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            initial_fetch_timeout_ms: default_initial_fetch_timeout_ms(),
            vote_timeout_ms: default_vote_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            degraded_threshold: default_degraded_threshold(),
            health_poll_interval_ms: default_health_poll_interval_ms(),
            conference: None,
            referral: None,
            log_requests: false,
        }
    }
}

impl KioskConfig {
    /// Loads the config file if there is one, then applies the environment.
    pub async fn load(path: Option<&Path>) -> Result<Self, TallyError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::read(path).await?,
            Some(path) => {
                tracing::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    async fn read(path: &Path) -> Result<Self, TallyError> {
        let content = fs::read_to_string(path).await?;

        if content.trim().is_empty() {
            tracing::warn!("Config file is empty, using default config");
            return Ok(Self::default());
        }

        match serde_json::from_str(&content) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config ({}), using default. File may be corrupted.",
                    e
                );
                Ok(Self::default())
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
    }

    /// Picks up `referral` and `conf` from the page URL the kiosk was opened with.
    pub fn apply_page_url(&mut self, page_url: &str) -> Result<(), TallyError> {
        let url = url::Url::parse(page_url)?;
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "referral" => self.referral = Some(value.into_owned()),
                "conf" => self.conference = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn initial_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.initial_fetch_timeout_ms)
    }

    pub fn vote_timeout(&self) -> Duration {
        Duration::from_millis(self.vote_timeout_ms)
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_interval_ms)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .with_reconnect_delay(Duration::from_millis(self.reconnect_delay_ms))
            .with_degraded_threshold(self.degraded_threshold)
    }

    pub fn client(&self) -> Result<TallyClient, TallyError> {
        let client_config = ClientConfig {
            enable_logging: self.log_requests,
            ..Default::default()
        };
        TallyClient::with_config(&self.base_url, client_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KioskConfig::default();
        assert_eq!(config.initial_fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.vote_timeout(), Duration::from_secs(20));
        assert_eq!(config.health_poll_interval(), Duration::from_secs(2));
        assert_eq!(
            config.retry_config().reconnect_delay,
            Duration::from_millis(3000)
        );
        assert_eq!(config.retry_config().degraded_threshold, 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: KioskConfig =
            serde_json::from_str(r#"{"base_url":"http://poll:9000","vote_timeout_ms":500}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://poll:9000");
        assert_eq!(config.vote_timeout_ms, 500);
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.conference, None);
    }

    #[test]
    fn test_page_url_query() {
        let mut config = KioskConfig::default();
        config
            .apply_page_url("http://kiosk.local/?referral=ACME42&conf=sreday&x=1")
            .unwrap();
        assert_eq!(config.referral.as_deref(), Some("ACME42"));
        assert_eq!(config.conference.as_deref(), Some("sreday"));

        let mut config = KioskConfig::default();
        config.apply_page_url("http://kiosk.local/?referral=").unwrap();
        assert_eq!(config.referral, None);
        assert!(config.apply_page_url("::nope").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.json");
        tokio::fs::write(&path, r#"{"health_poll_interval_ms":250}"#)
            .await
            .unwrap();

        let config = KioskConfig::read(&path).await.unwrap();
        assert_eq!(config.health_poll_interval_ms, 250);
    }

    #[tokio::test]
    async fn test_corrupt_or_empty_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiosk.json");

        tokio::fs::write(&path, "   ").await.unwrap();
        assert_eq!(KioskConfig::read(&path).await.unwrap(), KioskConfig::default());

        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert_eq!(KioskConfig::read(&path).await.unwrap(), KioskConfig::default());
    }
}
