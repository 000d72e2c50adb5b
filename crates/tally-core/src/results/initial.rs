use super::board::ResultsBoard;
use super::snapshot::ResultsSnapshot;
use crate::error::{Failure, FailureKind, FETCH_TIMEOUT_MESSAGE};
use std::sync::Arc;
use std::time::Duration;
use tally_http::TallyClient;

pub const VOTES_PATH: &str = "/votes";

/// One-shot, bounded load of the current results.
#[derive(Clone)]
pub struct InitialResultsFetcher {
    client: TallyClient,
    board: Arc<ResultsBoard>,
}

impl InitialResultsFetcher {
    pub fn new(client: TallyClient, board: Arc<ResultsBoard>) -> Self {
        Self { client, board }
    }

    /// Fetches `/votes` once. The request is dropped, and so aborted, when
    /// `timeout` expires. The outcome is also published on the board.
    pub async fn fetch_once(&self, timeout: Duration) -> Result<ResultsSnapshot, Failure> {
        let outcome = self.fetch(timeout).await;
        match &outcome {
            Ok(snapshot) => {
                if !self.board.apply_initial(snapshot) {
                    tracing::debug!("Initial results arrived after the stream, dropped");
                }
            }
            Err(failure) => {
                tracing::warn!("Failed to fetch initial results: {}", failure);
                self.board.report_initial(failure.clone());
            }
        }
        outcome
    }

    async fn fetch(&self, timeout: Duration) -> Result<ResultsSnapshot, Failure> {
        let response = match tokio::time::timeout(timeout, self.client.get(VOTES_PATH)).await {
            Err(_) => {
                return Err(Failure::new(FailureKind::Timeout, FETCH_TIMEOUT_MESSAGE));
            }
            Ok(Err(e)) => return Err(Failure::from_transport(&e, FETCH_TIMEOUT_MESSAGE)),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(Failure::from_fetch_status(
                response.status,
                response.detail(),
            ));
        }

        response.json::<ResultsSnapshot>().map_err(|e| {
            Failure::new(
                FailureKind::RequestFailed,
                format!("Unreadable results payload: {}", e),
            )
            .with_status(response.status)
        })
    }
}
