//! Main tally HTTP client.

use crate::client::config::ClientConfig;
use crate::client::native_network::NativeNetwork;
use crate::client::subscription::Subscription;
use crate::error::{Result, TallyError};
use crate::traits::TallyNetwork;
use crate::types::{TallyRequest, TallyResponse};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client bound to one polling service origin.
#[derive(Clone)]
pub struct TallyClient {
    network: Arc<dyn TallyNetwork>,
    config: Arc<ClientConfig>,
    base_url: Url,
}

impl TallyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connection_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host);

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| TallyError::Config(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TallyError::Config(e.to_string()))?;

        Ok(TallyClient {
            network: Arc::new(NativeNetwork::new(client)),
            config: Arc::new(config),
            base_url: Url::parse(base_url)?,
        })
    }

    /// Builds a client on top of any network implementation.
    pub fn with_network(base_url: &str, network: Arc<dyn TallyNetwork>) -> Result<Self> {
        Ok(TallyClient {
            network,
            config: Arc::new(ClientConfig::default()),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path such as `/votes` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub async fn get(&self, path: &str) -> Result<TallyResponse> {
        self.fetch(path, TallyRequest::new()).await
    }

    pub async fn post(&self, path: &str) -> Result<TallyResponse> {
        self.fetch(path, TallyRequest::post()).await
    }

    pub async fn fetch(&self, path: &str, request: TallyRequest) -> Result<TallyResponse> {
        let url = self.endpoint(path)?;
        self.log_request(url.as_str(), &request);
        let response = self.network.fetch(url.as_str(), request).await?;
        self.log_response(url.as_str(), &response);
        Ok(response)
    }

    pub async fn subscribe(&self, path: &str, request: TallyRequest) -> Result<Subscription> {
        let url = self.endpoint(path)?;
        self.log_request(url.as_str(), &request);
        self.network.subscribe(url.as_str(), request).await
    }

    fn log_request(&self, url: &str, request: &TallyRequest) {
        if self.config.enable_logging {
            tracing::info!("-> {} {} ({} bytes)", request.method, url, request.body.len());
        }
    }

    fn log_response(&self, url: &str, response: &TallyResponse) {
        if self.config.enable_logging {
            tracing::info!("<- {} {}", response.status, url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock_network::MockNetwork;

    #[test]
    fn test_client_init() {
        let client = TallyClient::new("http://localhost:8000").unwrap();
        assert!(!client.config().enable_logging);
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            TallyClient::new("not a url"),
            Err(TallyError::Url(_))
        ));
    }

    #[test]
    fn test_endpoint_resolution() {
        let client = TallyClient::new("http://poll.local:8000/").unwrap();
        assert_eq!(
            client.endpoint("/votes").unwrap().as_str(),
            "http://poll.local:8000/votes"
        );
        assert_eq!(
            client.endpoint("/admin/reset?confirm=yes").unwrap().as_str(),
            "http://poll.local:8000/admin/reset?confirm=yes"
        );
    }

    #[tokio::test]
    async fn test_json_post_goes_through_network() {
        let network = Arc::new(MockNetwork::new());
        network.push_response(200, r#"{"status":"ok"}"#);
        let client = TallyClient::with_network("http://poll.local", network.clone()).unwrap();

        let response = client
            .fetch(
                "/vote",
                TallyRequest::post()
                    .with_json(&serde_json::json!({ "choice": "ai" }))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.is_success());

        let requests = network.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "http://poll.local/vote");
        assert_eq!(&requests[0].body[..], br#"{"choice":"ai"}"#);
    }
}
