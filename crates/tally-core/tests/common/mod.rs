#![allow(dead_code)]

use std::sync::Arc;
use tally_core::{KioskConfig, KioskSession};
use tally_http::client::mock_network::MockNetwork;
use tally_http::TallyClient;

pub const BASE_URL: &str = "http://poll.local";

pub fn config() -> KioskConfig {
    KioskConfig {
        base_url: BASE_URL.to_string(),
        ..Default::default()
    }
}

pub fn session_with(config: KioskConfig) -> (Arc<MockNetwork>, KioskSession) {
    let network = Arc::new(MockNetwork::new());
    let client = TallyClient::with_network(&config.base_url, network.clone()).unwrap();
    (network, KioskSession::with_client(config, client))
}

pub fn session() -> (Arc<MockNetwork>, KioskSession) {
    session_with(config())
}

pub fn snapshot_json(counts: &[(&str, u64)]) -> String {
    let entries: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|(id, count)| (id.to_string(), serde_json::json!({ "count": count })))
        .collect();
    serde_json::Value::Object(entries).to_string()
}
