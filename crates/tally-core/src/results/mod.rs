//! Results view: snapshot model, aggregation and the two feeds that fill it.

mod aggregator;
mod board;
mod initial;
mod snapshot;
mod stream;

pub use aggregator::{aggregate, percentage, BarRow, ResultsView};
pub use board::{ResultsBoard, ResultsState, SnapshotSource};
pub use initial::{InitialResultsFetcher, VOTES_PATH};
pub use snapshot::{ChoiceTally, ResultsSnapshot};
pub use stream::{StreamingResultsClient, STREAM_PATH, VOTES_EVENT};
