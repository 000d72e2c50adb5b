pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::TallyClient;
pub use error::{Result, TallyError};
pub use types::{ServerEvent, TallyRequest, TallyResponse};
