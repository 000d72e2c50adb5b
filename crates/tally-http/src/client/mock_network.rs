//! Scripted in-memory network used by tests.

use crate::client::Subscription;
use crate::error::{Result, TallyError};
use crate::traits::TallyNetwork;
use crate::types::{ServerEvent, TallyRequest, TallyResponse};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// What the next `fetch` call does.
pub enum MockReply {
    Respond(TallyResponse),
    Fail(TallyError),
    /// Responds after the delay; combine with paused tokio time.
    Delayed(Duration, TallyResponse),
    /// Never resolves.
    Hang,
}

/// What the next `subscribe` call does.
pub enum MockSubscription {
    Open(async_channel::Receiver<Result<ServerEvent>>),
    Fail(TallyError),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: Bytes,
    pub headers: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct MockNetwork {
    replies: Mutex<VecDeque<MockReply>>,
    subscriptions: Mutex<VecDeque<MockSubscription>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.push_reply(MockReply::Respond(TallyResponse::new(
            status,
            body.to_string(),
        )));
    }

    pub fn push_failure(&self, err: TallyError) {
        self.push_reply(MockReply::Fail(err));
    }

    pub fn push_hang(&self) {
        self.push_reply(MockReply::Hang);
    }

    /// Queues an open stream and returns the sender that feeds it.
    pub fn push_stream(&self) -> async_channel::Sender<Result<ServerEvent>> {
        let (tx, rx) = async_channel::unbounded();
        lock(&self.subscriptions).push_back(MockSubscription::Open(rx));
        tx
    }

    pub fn push_subscribe_failure(&self, err: TallyError) {
        lock(&self.subscriptions).push_back(MockSubscription::Fail(err));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with(suffix))
            .collect()
    }

    fn record(&self, url: &str, req: &TallyRequest) {
        lock(&self.requests).push(RecordedRequest {
            method: req.method.clone(),
            url: url.to_string(),
            body: req.body.clone(),
            headers: req.extra_headers.clone(),
        });
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TallyNetwork for MockNetwork {
    async fn fetch(&self, url: &str, req: TallyRequest) -> Result<TallyResponse> {
        self.record(url, &req);
        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(err)) => Err(err),
            Some(MockReply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(TallyError::Http(format!("no scripted reply for {}", url))),
        }
    }

    async fn subscribe(&self, url: &str, req: TallyRequest) -> Result<Subscription> {
        self.record(url, &req);
        let next = lock(&self.subscriptions).pop_front();
        match next {
            Some(MockSubscription::Open(rx)) => Ok(Subscription::new(rx)),
            Some(MockSubscription::Fail(err)) => Err(err),
            None => std::future::pending().await,
        }
    }
}
