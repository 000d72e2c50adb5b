//! Casting the session's single vote.

mod attempt;
mod submitter;

pub use attempt::{VoteAttempt, VoteState};
pub use submitter::{SubmitRejected, VoteSubmitter, VOTE_PATH};
