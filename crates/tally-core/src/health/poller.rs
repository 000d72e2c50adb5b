use super::exposition::extract_pool_usage;
use super::pool::PoolStatus;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tally_http::TallyClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const METRICS_PATH: &str = "/metrics";

/// Samples database pool usage on a fixed interval.
///
/// A failed or incomplete poll leaves the published status untouched; the
/// next tick is the retry.
pub struct HealthPoller {
    client: TallyClient,
    interval: Duration,
    status: Arc<watch::Sender<Option<PoolStatus>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthPoller {
    pub fn new(client: TallyClient, interval: Duration) -> Self {
        let (status, _rx) = watch::channel(None);
        Self {
            client,
            interval,
            status: Arc::new(status),
            task: Mutex::new(None),
        }
    }

    pub fn status(&self) -> watch::Receiver<Option<PoolStatus>> {
        self.status.subscribe()
    }

    pub fn current(&self) -> Option<PoolStatus> {
        *self.status.borrow()
    }

    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let client = self.client.clone();
        let interval = self.interval;
        let status = self.status.clone();
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Some(next) = poll_pool(&client, interval).await {
                    status.send_replace(Some(next));
                }
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }

    /// Runs a single poll and publishes the result.
    pub async fn poll_once(&self) -> Option<PoolStatus> {
        let next = poll_pool(&self.client, self.interval).await?;
        self.status.send_replace(Some(next));
        Some(next)
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

async fn poll_pool(client: &TallyClient, timeout: Duration) -> Option<PoolStatus> {
    let response = match tokio::time::timeout(timeout, client.get(METRICS_PATH)).await {
        Ok(Ok(response)) if response.is_success() => response,
        Ok(Ok(response)) => {
            tracing::debug!("Metrics poll returned HTTP {}, skipping", response.status);
            return None;
        }
        Ok(Err(e)) => {
            tracing::debug!("Metrics poll failed: {}", e);
            return None;
        }
        Err(_) => {
            tracing::debug!("Metrics poll timed out after {:?}", timeout);
            return None;
        }
    };

    let (used, capacity) = extract_pool_usage(response.body_str()?)?;
    let status = PoolStatus::new(used, capacity);
    tracing::trace!("Pool {}/{} -> {:?}", used, capacity, status.severity);
    Some(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::PoolSeverity;
    use tally_http::client::mock_network::MockNetwork;
    use tally_http::TallyError;

    fn poller() -> (Arc<MockNetwork>, HealthPoller) {
        let network = Arc::new(MockNetwork::new());
        let client = TallyClient::with_network("http://poll.local", network.clone()).unwrap();
        (network, HealthPoller::new(client, Duration::from_millis(2000)))
    }

    #[tokio::test]
    async fn test_poll_once_classifies() {
        let (network, poller) = poller();
        network.push_response(200, "db_pool_size 10\ndb_pool_checked_out 9\n");

        let status = poller.poll_once().await.unwrap();
        assert_eq!(status.severity, PoolSeverity::Warning);
        assert_eq!(poller.current(), Some(status));
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous() {
        let (network, poller) = poller();
        network.push_response(200, "db_pool_size 10\ndb_pool_checked_out 10\n");
        network.push_failure(TallyError::Http("refused".into()));
        network.push_response(200, "db_pool_size 10\n");
        network.push_response(500, "boom");

        let first = poller.poll_once().await.unwrap();
        assert_eq!(first.severity, PoolSeverity::Critical);
        assert!(poller.poll_once().await.is_none());
        assert!(poller.poll_once().await.is_none());
        assert!(poller.poll_once().await.is_none());
        assert_eq!(poller.current(), Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (network, poller) = poller();
        network.push_response(200, "db_pool_size 10\ndb_pool_checked_out 8\n");
        network.push_response(200, "db_pool_size 10\ndb_pool_checked_out 10\n");
        let mut rx = poller.status();

        poller.start();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().unwrap().severity, PoolSeverity::Normal);

        let before = tokio::time::Instant::now();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().unwrap().severity, PoolSeverity::Critical);
        assert!(before.elapsed() >= Duration::from_millis(2000));

        poller.stop();
        assert_eq!(network.requests_to("/metrics").len(), 2);
    }
}
