//! Server-sent-events subscription handle.

use crate::error::Result;
use crate::types::ServerEvent;
use tokio::task::JoinHandle;

pub struct Subscription {
    receiver: async_channel::Receiver<Result<ServerEvent>>,
    last_event_id: Option<String>,
    reader: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(receiver: async_channel::Receiver<Result<ServerEvent>>) -> Self {
        Subscription {
            receiver,
            last_event_id: None,
            reader: None,
        }
    }

    /// Ties the task reading the response body to this handle; closing the
    /// subscription aborts it and drops the connection.
    pub fn with_reader(mut self, reader: JoinHandle<()>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Waits for the next event. `None` once the server ended the stream.
    pub async fn next(&mut self) -> Option<Result<ServerEvent>> {
        let item = self.receiver.recv().await.ok();
        if let Some(Ok(event)) = &item {
            if event.id.is_some() {
                self.last_event_id = event.id.clone();
            }
        }
        item
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Closes the channel and aborts the reader, closing the connection even
    /// while the server is idle.
    pub fn close(&self) {
        self.receiver.close();
        if let Some(reader) = &self.reader {
            reader.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
