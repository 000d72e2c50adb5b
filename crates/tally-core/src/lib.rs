//! tally-core: the synchronization and resilience layer of the tally kiosk.
//!
//! - **results**: live results board, initial fetch and the streaming client.
//! - **health**: database pool polling and readiness probes.
//! - **vote**: the single-vote submission state machine.
//! - **admin** / **branding**: thin one-shot calls and static lookups.

pub mod admin;
pub mod branding;
pub mod choices;
pub mod config;
pub mod error;
pub mod health;
pub mod results;
pub mod session;
pub mod vote;

pub use crate::choices::{Choice, ChoiceCatalog};
pub use crate::config::KioskConfig;
pub use crate::error::{Failure, FailureKind};
pub use crate::session::KioskSession;
pub use tally_http::client::{ConnectionHealth, ConnectionSeverity};
