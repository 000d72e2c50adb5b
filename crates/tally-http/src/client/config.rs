//! Configuration for the tally HTTP client.

/// Configuration for the tally HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Connection establishment timeout in seconds.
    pub connection_timeout_secs: u64,
    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_timeout_secs: u64,
    /// Maximum idle connections kept per host.
    pub max_idle_per_host: usize,
    /// Enable request/response logging.
    pub enable_logging: bool,
    /// Proxy URL (optional).
    pub proxy_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            connection_timeout_secs: 5,
            pool_idle_timeout_secs: 90,
            max_idle_per_host: 8,
            enable_logging: false,
            proxy_url: String::new(),
            user_agent: concat!("tally-kiosk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.connection_timeout_secs, 5);
        assert_eq!(config.pool_idle_timeout_secs, 90);
        assert_eq!(config.max_idle_per_host, 8);
        assert!(!config.enable_logging);
        assert_eq!(config.proxy_url, "");
        assert!(config.user_agent.starts_with("tally-kiosk/"));
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            enable_logging: true,
            ..Default::default()
        };
        assert!(config.enable_logging);
        assert_eq!(config.connection_timeout_secs, 5);
    }

    #[test]
    fn test_clone() {
        let config = ClientConfig::default();
        assert_eq!(config.clone(), config);
    }
}
