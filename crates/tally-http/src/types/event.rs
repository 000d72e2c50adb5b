/// A dispatched server-sent event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerEvent {
    /// Event type; `message` when the server did not name it.
    pub event: String,
    pub data: String,
    /// Last event id seen on the stream when this event was dispatched.
    pub id: Option<String>,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        ServerEvent {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.event == name
    }
}
