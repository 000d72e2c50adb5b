//! Conference branding shown on the kiosk header.

use crate::error::{Failure, FailureKind, FETCH_TIMEOUT_MESSAGE};
use serde::Deserialize;
use std::time::Duration;
use tally_http::TallyClient;

pub const VERSION_PATH: &str = "/version";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub conference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conference {
    pub id: &'static str,
    pub name: &'static str,
    pub logo: &'static str,
}

const CONFERENCES: &[Conference] = &[
    Conference {
        id: "sreday",
        name: "SREday",
        logo: "/static/logos/sreday.svg",
    },
    Conference {
        id: "devopsdays",
        name: "DevOpsDays",
        logo: "/static/logos/devopsdays.svg",
    },
    Conference {
        id: "kubecon",
        name: "KubeCon",
        logo: "/static/logos/kubecon.svg",
    },
];

const DEFAULT_CONFERENCE: Conference = Conference {
    id: "default",
    name: "Live Poll",
    logo: "/static/logos/default.svg",
};

pub fn lookup(conference: Option<&str>) -> Conference {
    conference
        .map(|c| c.trim().to_ascii_lowercase())
        .and_then(|c| CONFERENCES.iter().find(|conf| conf.id == c).copied())
        .unwrap_or(DEFAULT_CONFERENCE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub version: String,
    pub conference: Conference,
}

/// Resolves which conference the kiosk is branded for.
#[derive(Clone)]
pub struct BrandingResolver {
    client: TallyClient,
    timeout: Duration,
}

impl BrandingResolver {
    pub fn new(client: TallyClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Asks `/version` for the build and conference; `conf_override` wins.
    pub async fn resolve(&self, conf_override: Option<&str>) -> Result<Branding, Failure> {
        let response = match tokio::time::timeout(self.timeout, self.client.get(VERSION_PATH)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(Failure::from_transport(&e, FETCH_TIMEOUT_MESSAGE)),
            Err(_) => return Err(Failure::new(FailureKind::Timeout, FETCH_TIMEOUT_MESSAGE)),
        };
        if !response.is_success() {
            return Err(Failure::from_fetch_status(response.status, response.detail()));
        }
        let info: VersionInfo = response.json().map_err(|e| {
            Failure::new(FailureKind::RequestFailed, format!("Unreadable version payload: {}", e))
        })?;

        let conference = conf_override.or(info.conference.as_deref());
        tracing::debug!("Branding for {:?}, server {}", conference, info.version);
        Ok(Branding {
            conference: lookup(conference),
            version: info.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tally_http::client::mock_network::MockNetwork;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(Some("SREday")).name, "SREday");
        assert_eq!(lookup(Some("unknown")), DEFAULT_CONFERENCE);
        assert_eq!(lookup(None), DEFAULT_CONFERENCE);
    }

    #[tokio::test]
    async fn test_override_beats_server() {
        let network = Arc::new(MockNetwork::new());
        network.push_response(200, r#"{"version":"1.4.2","conference":"sreday"}"#);
        network.push_response(200, r#"{"version":"1.4.2","conference":"sreday"}"#);
        network.push_response(200, r#"{"version":"1.4.2"}"#);
        let client = TallyClient::with_network("http://poll.local", network).unwrap();
        let resolver = BrandingResolver::new(client, Duration::from_secs(10));

        let branding = resolver.resolve(None).await.unwrap();
        assert_eq!(branding.version, "1.4.2");
        assert_eq!(branding.conference.id, "sreday");

        let branding = resolver.resolve(Some("kubecon")).await.unwrap();
        assert_eq!(branding.conference.id, "kubecon");

        let branding = resolver.resolve(None).await.unwrap();
        assert_eq!(branding.conference, DEFAULT_CONFERENCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_version_endpoint_times_out() {
        let network = Arc::new(MockNetwork::new());
        network.push_hang();
        let client = TallyClient::with_network("http://poll.local", network).unwrap();
        let resolver = BrandingResolver::new(client, Duration::from_secs(10));

        let failure = resolver.resolve(Some("sreday")).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Timeout);
    }
}
