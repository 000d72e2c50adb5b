//! State cell behind the results view.

use super::aggregator::{aggregate, ResultsView};
use super::snapshot::ResultsSnapshot;
use crate::choices::ChoiceCatalog;
use crate::error::Failure;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Initial,
    Stream,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsState {
    pub view: Option<ResultsView>,
    /// Persistent error banner; cleared by the next applied snapshot.
    pub banner: Option<Failure>,
    pub source: Option<SnapshotSource>,
}

/// Latest results plus banner, shared by the initial fetch and the stream.
///
/// Snapshots replace the view wholesale in arrival order. The one-shot
/// initial fetch never overwrites data that already came from the stream.
pub struct ResultsBoard {
    catalog: ChoiceCatalog,
    tx: watch::Sender<ResultsState>,
}

impl ResultsBoard {
    pub fn new(catalog: ChoiceCatalog) -> Self {
        let (tx, _rx) = watch::channel(ResultsState::default());
        Self { catalog, tx }
    }

    pub fn catalog(&self) -> &ChoiceCatalog {
        &self.catalog
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultsState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ResultsState {
        self.tx.borrow().clone()
    }

    /// Applies the initial snapshot; returns `false` if the stream got there first.
    pub fn apply_initial(&self, snapshot: &ResultsSnapshot) -> bool {
        let view = aggregate(snapshot, &self.catalog);
        self.tx.send_if_modified(|state| {
            if state.source == Some(SnapshotSource::Stream) {
                return false;
            }
            *state = ResultsState {
                view: Some(view),
                banner: None,
                source: Some(SnapshotSource::Initial),
            };
            true
        })
    }

    pub fn apply_stream(&self, snapshot: &ResultsSnapshot) -> ResultsView {
        let view = aggregate(snapshot, &self.catalog);
        self.tx.send_replace(ResultsState {
            view: Some(view.clone()),
            banner: None,
            source: Some(SnapshotSource::Stream),
        });
        view
    }

    /// Raises the banner; the last good view stays on screen underneath it.
    pub fn report(&self, failure: Failure) {
        if !failure.shows_banner() {
            return;
        }
        self.tx.send_if_modified(|state| {
            if state.banner.as_ref() == Some(&failure) {
                return false;
            }
            state.banner = Some(failure);
            true
        });
    }

    /// Like [`report`](Self::report), but ignored once the stream is live.
    pub fn report_initial(&self, failure: Failure) {
        if self.tx.borrow().source == Some(SnapshotSource::Stream) {
            return;
        }
        self.report(failure);
    }
}

impl Default for ResultsBoard {
    fn default() -> Self {
        Self::new(ChoiceCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_stream_snapshot_replaces_view_and_clears_banner() {
        let board = ResultsBoard::default();
        board.report(Failure::network());
        assert!(board.current().banner.is_some());

        board.apply_stream(&ResultsSnapshot::from_counts([("ai", 4)]));
        let state = board.current();
        assert!(state.banner.is_none());
        assert_eq!(state.view.unwrap().total, 4);

        board.apply_stream(&ResultsSnapshot::from_counts([("print", 1)]));
        let view = board.current().view.unwrap();
        assert_eq!(view.total, 1);
        assert_eq!(view.row("ai").unwrap().count, 0);
    }

    #[test]
    fn test_initial_does_not_override_stream() {
        let board = ResultsBoard::default();
        board.apply_stream(&ResultsSnapshot::from_counts([("ai", 9)]));
        assert!(!board.apply_initial(&ResultsSnapshot::from_counts([("ai", 2)])));
        assert_eq!(board.current().view.unwrap().total, 9);

        board.report_initial(Failure::network());
        assert!(board.current().banner.is_none());
    }

    #[test]
    fn test_failure_keeps_last_view() {
        let board = ResultsBoard::default();
        assert!(board.apply_initial(&ResultsSnapshot::from_counts([("stare", 2)])));
        board.report(Failure::new(FailureKind::StreamError, "down"));
        let state = board.current();
        assert_eq!(state.view.unwrap().total, 2);
        assert_eq!(state.banner.unwrap().kind, FailureKind::StreamError);
    }

    #[test]
    fn test_cancelled_raises_no_banner() {
        let board = ResultsBoard::default();
        board.report(Failure::cancelled());
        assert!(board.current().banner.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let board = ResultsBoard::default();
        let mut rx = board.subscribe();
        board.apply_stream(&ResultsSnapshot::from_counts([("ai", 1)]));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().view.as_ref().unwrap().total, 1);
    }
}
