//! Outgoing request parameters.

use crate::error::Result;
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct TallyRequest {
    pub method: String,
    pub body: Bytes,
    pub content_type: Option<String>,
    pub extra_headers: BTreeMap<String, String>,
}

impl TallyRequest {
    #[inline]
    pub fn new() -> Self {
        Self {
            method: "GET".to_string(),
            ..Default::default()
        }
    }

    pub fn post() -> Self {
        Self::new().with_method("POST")
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the body and sets `application/json`.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_body(body)
            .with_content_type("application/json"))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}
