//! Tally HTTP client implementation.

mod config;
mod fetch;
#[cfg(any(test, feature = "mock"))]
pub mod mock_network;
pub mod native_network;
mod parser;
pub mod retry;
mod subscription;

pub use config::ClientConfig;
pub use fetch::TallyClient;
pub use parser::EventParser;
pub use retry::{ConnectionHealth, ConnectionRetryPolicy, ConnectionSeverity, RetryConfig};
pub use subscription::Subscription;
