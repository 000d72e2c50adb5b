//! Incremental parser for `text/event-stream` bodies.

use crate::error::{Result, TallyError};
use crate::types::ServerEvent;
use bytes::{Buf, BytesMut};

const DEFAULT_EVENT: &str = "message";

#[derive(Debug, Default)]
pub struct EventParser {
    buffer: BytesMut,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
}

impl EventParser {
    pub fn new() -> Self {
        EventParser {
            buffer: BytesMut::with_capacity(4096),
            ..Default::default()
        }
    }

    /// Feeds a chunk and returns every event completed by it.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<ServerEvent>> {
        self.buffer.extend_from_slice(data);
        let mut events = Vec::new();

        while let Some((end, terminator)) = self.find_line_end() {
            let line = self.buffer.split_to(end);
            self.buffer.advance(terminator);
            let line = std::str::from_utf8(&line)
                .map_err(|e| TallyError::Protocol(format!("Invalid event-stream UTF-8: {}", e)))?;
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Returns the line length and the terminator length (`\n`, `\r` or `\r\n`).
    fn find_line_end(&self) -> Option<(usize, usize)> {
        let pos = self.buffer.iter().position(|b| *b == b'\n' || *b == b'\r')?;
        if self.buffer[pos] == b'\n' {
            return Some((pos, 1));
        }
        match self.buffer.get(pos + 1) {
            Some(b'\n') => Some((pos, 2)),
            Some(_) => Some((pos, 1)),
            // a lone trailing CR may be the first half of CRLF
            None => None,
        }
    }

    fn process_line(&mut self, line: &str) -> Option<ServerEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(ServerEvent {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
