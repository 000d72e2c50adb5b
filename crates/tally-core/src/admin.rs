//! Session reset for the demo operator.

use crate::error::{Failure, FailureKind, FETCH_TIMEOUT_MESSAGE};
use std::time::Duration;
use tally_http::TallyClient;

pub const RESET_PATH: &str = "/admin/reset?confirm=yes";

/// Clears every vote of the current demo session. One request, no retry.
#[derive(Clone)]
pub struct SessionResetController {
    client: TallyClient,
    timeout: Duration,
}

impl SessionResetController {
    pub fn new(client: TallyClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn reset(&self) -> Result<(), Failure> {
        let response = match tokio::time::timeout(self.timeout, self.client.post(RESET_PATH)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(Failure::from_transport(&e, FETCH_TIMEOUT_MESSAGE)),
            Err(_) => return Err(Failure::new(FailureKind::Timeout, FETCH_TIMEOUT_MESSAGE)),
        };

        if response.is_success() {
            tracing::info!("Session votes cleared");
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
    async fn test_reset_posts_confirmation() {
        let network = Arc::new(MockNetwork::new());
        network.push_response(200, r#"{"status":"reset"}"#);
        network.push_response(403, r#"{"detail":"Forbidden"}"#);
        let client = TallyClient::with_network("http://poll.local", network.clone()).unwrap();
        let controller = SessionResetController::new(client, Duration::from_secs(10));

        controller.reset().await.unwrap();
        let requests = network.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "http://poll.local/admin/reset?confirm=yes");

        let failure = controller.reset().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::RequestFailed);
        assert_eq!(failure.message, "Forbidden");
        assert_eq!(network.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_gives_up_on_hung_server() {
        let network = Arc::new(MockNetwork::new());
        network.push_hang();
        let client = TallyClient::with_network("http://poll.local", network).unwrap();
        let controller = SessionResetController::new(client, Duration::from_secs(10));

        let failure = controller.reset().await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Timeout);
    }
}
