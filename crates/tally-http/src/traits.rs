use crate::client::Subscription;
use crate::error::Result;
use crate::types::{TallyRequest, TallyResponse};
use async_trait::async_trait;

/// Abstraction for network operations.
///
/// Components never talk to reqwest directly; they go through this trait so
/// that the same state machines run against the live service or a scripted
/// double.
#[async_trait]
pub trait TallyNetwork: Send + Sync + 'static {
    async fn fetch(&self, url: &str, req: TallyRequest) -> Result<TallyResponse>;

    /// Opens a server-sent-events stream. The subscription ends when the
    /// server ends the response; closing or dropping it closes the connection.
    async fn subscribe(&self, url: &str, req: TallyRequest) -> Result<Subscription>;
}
