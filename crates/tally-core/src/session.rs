//! Everything one kiosk screen needs, wired from a [`KioskConfig`].

use crate::admin::SessionResetController;
use crate::branding::{Branding, BrandingResolver};
use crate::choices::ChoiceCatalog;
use crate::config::KioskConfig;
use crate::error::Failure;
use crate::health::{HealthPoller, ReadinessProbe};
use crate::results::{InitialResultsFetcher, ResultsBoard, ResultsSnapshot, StreamingResultsClient};
use crate::vote::{SubmitRejected, VoteAttempt, VoteSubmitter};
use std::sync::Arc;
use tally_http::{TallyClient, TallyError};

pub struct KioskSession {
    config: KioskConfig,
    client: TallyClient,
    board: Arc<ResultsBoard>,
    fetcher: InitialResultsFetcher,
    stream: StreamingResultsClient,
    poller: HealthPoller,
    submitter: Arc<VoteSubmitter>,
    reset: SessionResetController,
    branding: BrandingResolver,
    probe: ReadinessProbe,
}

impl KioskSession {
    pub fn new(config: KioskConfig) -> Result<Self, TallyError> {
        let client = config.client()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: KioskConfig, client: TallyClient) -> Self {
        let catalog = ChoiceCatalog::default();
        let board = Arc::new(ResultsBoard::new(catalog));
        Self {
            fetcher: InitialResultsFetcher::new(client.clone(), board.clone()),
            stream: StreamingResultsClient::new(
                client.clone(),
                board.clone(),
                config.retry_config(),
            ),
            poller: HealthPoller::new(client.clone(), config.health_poll_interval()),
            submitter: Arc::new(VoteSubmitter::new(
                client.clone(),
                catalog,
                config.vote_timeout(),
            )),
            reset: SessionResetController::new(client.clone(), config.initial_fetch_timeout()),
            branding: BrandingResolver::new(client.clone(), config.initial_fetch_timeout()),
            probe: ReadinessProbe::new(client.clone(), config.initial_fetch_timeout()),
            board,
            client,
            config,
        }
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn client(&self) -> &TallyClient {
        &self.client
    }

    pub fn board(&self) -> &Arc<ResultsBoard> {
        &self.board
    }

    pub fn stream(&self) -> &StreamingResultsClient {
        &self.stream
    }

    pub fn poller(&self) -> &HealthPoller {
        &self.poller
    }

    pub fn submitter(&self) -> &Arc<VoteSubmitter> {
        &self.submitter
    }

    pub fn probe(&self) -> &ReadinessProbe {
        &self.probe
    }

    /// Opens the live stream and loads the current results alongside it.
    /// Whichever arrives later wins only if it is the stream.
    pub async fn start_results(&self) -> Result<ResultsSnapshot, Failure> {
        self.stream.start();
        self.fetcher
            .fetch_once(self.config.initial_fetch_timeout())
            .await
    }

    pub fn start_health(&self) {
        self.poller.start();
    }

    pub async fn vote(&self, choice_id: &str) -> Result<VoteAttempt, SubmitRejected> {
        self.submitter
            .submit(choice_id, self.config.referral.as_deref())
            .await
    }

    pub async fn branding(&self) -> Result<Branding, Failure> {
        self.branding.resolve(self.config.conference.as_deref()).await
    }

    pub async fn reset(&self) -> Result<(), Failure> {
        self.reset.reset().await
    }

    pub fn shutdown(&self) {
        self.stream.stop();
        self.poller.stop();
        self.submitter.abort();
    }
}
