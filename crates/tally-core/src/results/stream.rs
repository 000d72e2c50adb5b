//! Live results over server-sent events, with reconnection.

use super::board::ResultsBoard;
use super::snapshot::ResultsSnapshot;
use crate::error::Failure;
use parking_lot::Mutex;
use std::sync::Arc;
use tally_http::client::{ConnectionHealth, ConnectionRetryPolicy, RetryConfig};
use tally_http::{TallyClient, TallyError, TallyRequest};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const STREAM_PATH: &str = "/stream";
pub const VOTES_EVENT: &str = "votes";

pub struct StreamingResultsClient {
    client: TallyClient,
    board: Arc<ResultsBoard>,
    retry: RetryConfig,
    health: Arc<watch::Sender<ConnectionHealth>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamingResultsClient {
    pub fn new(client: TallyClient, board: Arc<ResultsBoard>, retry: RetryConfig) -> Self {
        let (health, _rx) = watch::channel(ConnectionHealth::default());
        Self {
            client,
            board,
            retry,
            health: Arc::new(health),
            task: Mutex::new(None),
        }
    }

    /// Notified whenever the connection severity changes.
    pub fn health(&self) -> watch::Receiver<ConnectionHealth> {
        self.health.subscribe()
    }

    pub fn current_health(&self) -> ConnectionHealth {
        *self.health.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Starts the subscription loop. Calling it while running is a no-op.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let client = self.client.clone();
        let board = self.board.clone();
        let health = self.health.clone();
        let policy = ConnectionRetryPolicy::new(self.retry.clone());
        *task = Some(tokio::spawn(run(client, board, health, policy)));
    }

    /// Tears the subscription down. The connection closes with the task.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            tracing::info!("Results stream stopped");
        }
    }
}

impl Drop for StreamingResultsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn run(
    client: TallyClient,
    board: Arc<ResultsBoard>,
    health: Arc<watch::Sender<ConnectionHealth>>,
    mut policy: ConnectionRetryPolicy,
) {
    let mut last_event_id: Option<String> = None;

    loop {
        let err = match stream_once(&client, &board, &health, &mut policy, &mut last_event_id).await
        {
            Ok(()) => TallyError::SubscriptionClosed,
            Err(e) => e,
        };

        publish(&health, policy.record_failure());
        board.report(Failure::stream(&err));
        tracing::warn!(
            "Results stream failed ({} in a row): {}. Reconnecting in {:?}",
            policy.consecutive_failures(),
            err,
            policy.reconnect_delay()
        );

        tokio::time::sleep(policy.reconnect_delay()).await;
    }
}

/// Runs one subscription until it breaks or the server ends it (`Ok`). The
/// subscription is closed before this returns.
async fn stream_once(
    client: &TallyClient,
    board: &ResultsBoard,
    health: &watch::Sender<ConnectionHealth>,
    policy: &mut ConnectionRetryPolicy,
    last_event_id: &mut Option<String>,
) -> tally_http::Result<()> {
    let mut request = TallyRequest::new();
    if let Some(id) = last_event_id.as_deref() {
        request = request.with_header("Last-Event-ID", id);
    }

    let mut subscription = client.subscribe(STREAM_PATH, request).await?;
    tracing::info!("Subscribed to {}", STREAM_PATH);

    while let Some(item) = subscription.next().await {
        let event = item?;
        if let Some(id) = subscription.last_event_id() {
            *last_event_id = Some(id.to_string());
        }
        if !event.is(VOTES_EVENT) {
            tracing::trace!("Ignoring {} event", event.event);
            continue;
        }

        let snapshot = ResultsSnapshot::parse(&event.data)?;
        let view = board.apply_stream(&snapshot);
        tracing::debug!("Applied stream snapshot, total {}", view.total);
        publish(health, policy.record_success());
    }

    subscription.close();
    Ok(())
}

/// Stores the new health; subscribers wake only when the severity moved.
fn publish(health: &watch::Sender<ConnectionHealth>, next: ConnectionHealth) {
    health.send_if_modified(|current| {
        let changed = current.severity != next.severity;
        *current = next;
        changed
    });
}
