//! Vote submission state machine: `idle -> pending -> {confirmed | failed}`.

use super::attempt::{VoteAttempt, VoteState};
use crate::choices::ChoiceCatalog;
use crate::error::{Failure, FailureKind, VOTE_TIMEOUT_MESSAGE};
use futures::future::{AbortHandle, Abortable, Aborted};
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tally_http::{TallyClient, TallyRequest, TallyResponse};
use tokio::sync::watch;

pub const VOTE_PATH: &str = "/vote";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a vote for {choice_id} is already in flight")]
    AlreadyPending { choice_id: String },
    #[error("this session has already voted")]
    AlreadyConfirmed,
    #[error("there is no failed vote to retry")]
    NothingToRetry,
    #[error("unknown choice {0}")]
    UnknownChoice(String),
}

#[derive(Serialize)]
struct VoteBody<'a> {
    choice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    referral: Option<&'a str>,
}

pub struct VoteSubmitter {
    client: TallyClient,
    catalog: ChoiceCatalog,
    timeout: Duration,
    attempt: watch::Sender<Option<VoteAttempt>>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl VoteSubmitter {
    pub fn new(client: TallyClient, catalog: ChoiceCatalog, timeout: Duration) -> Self {
        let (attempt, _rx) = watch::channel(None);
        Self {
            client,
            catalog,
            timeout,
            attempt,
            in_flight: Mutex::new(None),
        }
    }

    /// Every transition of the current attempt.
    pub fn attempts(&self) -> watch::Receiver<Option<VoteAttempt>> {
        self.attempt.subscribe()
    }

    pub fn current(&self) -> Option<VoteAttempt> {
        self.attempt.borrow().clone()
    }

    pub fn state(&self) -> VoteState {
        self.attempt
            .borrow()
            .as_ref()
            .map(|a| a.state.clone())
            .unwrap_or_default()
    }

    /// Label of the confirmed choice, for the confirmation screen.
    pub fn confirmed_label(&self) -> Option<&'static str> {
        let attempt = self.attempt.borrow();
        let attempt = attempt.as_ref().filter(|a| a.is_confirmed())?;
        self.catalog.label(attempt.choice_id())
    }

    /// Casts a vote. Resolves once the attempt is confirmed or failed.
    pub async fn submit(
        &self,
        choice_id: &str,
        referral_code: Option<&str>,
    ) -> Result<VoteAttempt, SubmitRejected> {
        if !self.catalog.contains(choice_id) {
            return Err(SubmitRejected::UnknownChoice(choice_id.to_string()));
        }
        let attempt = VoteAttempt::new(choice_id, referral_code.map(str::to_string));
        let pending = self.begin(attempt, admit_new)?;
        Ok(self.send(pending).await)
    }

    /// Re-sends the last choice after a failure, with a fresh timeout window.
    pub async fn retry(&self) -> Result<VoteAttempt, SubmitRejected> {
        let last = self
            .current()
            .filter(|a| a.failure().is_some())
            .ok_or(SubmitRejected::NothingToRetry)?;
        tracing::info!("Retrying vote for {}", last.choice_id());

        let attempt = VoteAttempt::new(last.choice_id(), last.referral_code().map(str::to_string));
        let pending = self.begin(attempt, |current| match current {
            Some(a) if a.failure().is_some() => Ok(()),
            other => admit_new(other).and(Err(SubmitRejected::NothingToRetry)),
        })?;
        Ok(self.send(pending).await)
    }

    /// Cancels the in-flight request, failing the attempt as cancelled.
    pub fn abort(&self) -> bool {
        match self.in_flight.lock().take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Moves to `pending` atomically with the admission check.
    fn begin(
        &self,
        attempt: VoteAttempt,
        admit: impl FnOnce(Option<&VoteAttempt>) -> Result<(), SubmitRejected>,
    ) -> Result<VoteAttempt, SubmitRejected> {
        let pending = attempt.with_state(VoteState::Pending);
        let mut verdict = Ok(());
        self.attempt.send_if_modified(|current| {
            verdict = admit(current.as_ref());
            if verdict.is_err() {
                return false;
            }
            *current = Some(pending.clone());
            true
        });
        verdict.map(|()| pending)
    }

    async fn send(&self, attempt: VoteAttempt) -> VoteAttempt {
        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.lock() = Some(handle);
        let guard = InFlight {
            submitter: self,
            attempt: Some(attempt.clone()),
        };

        let body = VoteBody {
            choice: attempt.choice_id(),
            referral: attempt.referral_code(),
        };
        let state = match TallyRequest::post().with_json(&body) {
            Ok(request) => {
                let call = Abortable::new(self.client.fetch(VOTE_PATH, request), registration);
                classify(tokio::time::timeout(self.timeout, call).await)
            }
            Err(e) => VoteState::Failed(Failure::new(FailureKind::RequestFailed, e.to_string())),
        };
        guard.settle();

        match &state {
            VoteState::Confirmed => tracing::info!("Vote for {} confirmed", attempt.choice_id()),
            VoteState::Failed(f) => {
                tracing::warn!("Vote for {} failed ({:?}): {}", attempt.choice_id(), f.kind, f)
            }
            _ => {}
        }

        let done = attempt.with_state(state);
        self.attempt.send_replace(Some(done.clone()));
        done
    }
}

/// Clears the abort handle when `send` ends. If `send` is dropped before the
/// response is classified, the attempt is published as cancelled so it never
/// stays pending.
struct InFlight<'a> {
    submitter: &'a VoteSubmitter,
    attempt: Option<VoteAttempt>,
}

impl InFlight<'_> {
    fn settle(mut self) {
        self.attempt = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.submitter.in_flight.lock().take();
        if let Some(attempt) = self.attempt.take() {
            tracing::warn!("Vote for {} dropped while in flight", attempt.choice_id());
            let cancelled = attempt.with_state(VoteState::Failed(Failure::cancelled()));
            self.submitter.attempt.send_replace(Some(cancelled));
        }
    }
}

fn admit_new(current: Option<&VoteAttempt>) -> Result<(), SubmitRejected> {
    match current {
        Some(a) if a.is_pending() => Err(SubmitRejected::AlreadyPending {
            choice_id: a.choice_id().to_string(),
        }),
        Some(a) if a.is_confirmed() => Err(SubmitRejected::AlreadyConfirmed),
        _ => Ok(()),
    }
}

type CallResult = Result<Result<tally_http::Result<TallyResponse>, Aborted>, tokio::time::error::Elapsed>;

fn classify(result: CallResult) -> VoteState {
    let failure = match result {
        Err(_) => Failure::new(FailureKind::Timeout, VOTE_TIMEOUT_MESSAGE),
        Ok(Err(Aborted)) => Failure::cancelled(),
        Ok(Ok(Err(e))) => Failure::from_transport(&e, VOTE_TIMEOUT_MESSAGE),
        Ok(Ok(Ok(response))) if response.is_success() => return VoteState::Confirmed,
        Ok(Ok(Ok(response))) => Failure::from_vote_status(response.status, response.detail()),
    };
    VoteState::Failed(failure)
}
