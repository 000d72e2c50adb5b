//! Request, response and event types shared by the client and its callers.

mod event;
mod request;
mod response;

pub use event::ServerEvent;
pub use request::TallyRequest;
pub use response::TallyResponse;
