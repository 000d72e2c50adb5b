use crate::error::{Failure, FailureKind, FETCH_TIMEOUT_MESSAGE};
use std::time::Duration;
use tally_http::TallyClient;

pub const HEALTH_PATH: &str = "/health";
pub const READY_PATH: &str = "/ready";

/// One-shot liveness and readiness checks against the service.
#[derive(Clone)]
pub struct ReadinessProbe {
    client: TallyClient,
    timeout: Duration,
}

impl ReadinessProbe {
    pub fn new(client: TallyClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The process answers at all.
    pub async fn check_health(&self) -> Result<(), Failure> {
        self.check(HEALTH_PATH).await
    }

    /// Backing stores are reachable; the failure carries the server's reason.
    pub async fn check_ready(&self) -> Result<(), Failure> {
        self.check(READY_PATH).await
    }

    async fn check(&self, path: &str) -> Result<(), Failure> {
        let response = match tokio::time::timeout(self.timeout, self.client.get(path)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(Failure::from_transport(&e, FETCH_TIMEOUT_MESSAGE)),
            Err(_) => return Err(Failure::new(FailureKind::Timeout, FETCH_TIMEOUT_MESSAGE)),
        };

        if response.is_success() {
            Ok(())
        } else {
            Err(Failure::from_fetch_status(response.status, response.detail()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tally_http::client::mock_network::MockNetwork;

    #[tokio::test]
    async fn test_ready_reports_detail() {
        let network = Arc::new(MockNetwork::new());
        network.push_response(200, r#"{"status":"healthy"}"#);
        network.push_response(503, r#"{"detail":"PostgreSQL not available"}"#);
        let client = TallyClient::with_network("http://poll.local", network.clone()).unwrap();
        let probe = ReadinessProbe::new(client, Duration::from_secs(2));

        assert!(probe.check_health().await.is_ok());
        let failure = probe.check_ready().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::ServerError);
        assert_eq!(failure.message, "PostgreSQL not available");
        assert_eq!(network.requests_to("/ready").len(), 1);
    }
}
