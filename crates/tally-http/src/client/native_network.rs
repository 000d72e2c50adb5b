use crate::client::parser::EventParser;
use crate::client::subscription::Subscription;
use crate::error::{Result, TallyError};
use crate::traits::TallyNetwork;
use crate::types::{TallyRequest, TallyResponse};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::collections::BTreeMap;

pub struct NativeNetwork {
    client: Client,
}

impl NativeNetwork {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn build(&self, url: &str, request: &TallyRequest) -> reqwest::RequestBuilder {
        let method = match request.method.to_uppercase().as_str() {
            "POST" => reqwest::Method::POST,
            "PUT" => reqwest::Method::PUT,
            "DELETE" => reqwest::Method::DELETE,
            _ => reqwest::Method::GET,
        };

        let mut req_builder = self.client.request(method, url);
        for (k, v) in &request.extra_headers {
            req_builder = req_builder.header(k, v);
        }

        if request.has_body() {
            let ct = request
                .content_type
                .as_deref()
                .unwrap_or("application/json");
            req_builder = req_builder
                .header(reqwest::header::CONTENT_TYPE, ct)
                .body(request.body.clone());
        }
        req_builder
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (k, v) in headers {
        if let Ok(val) = v.to_str() {
            out.insert(k.as_str().to_lowercase(), val.to_string());
        }
    }
    out
}

#[async_trait]
impl TallyNetwork for NativeNetwork {
    async fn fetch(&self, url: &str, request: TallyRequest) -> Result<TallyResponse> {
        tracing::debug!("[TallyHTTP-Out] {} {}", request.method, url);

        let response = self
            .build(url, &request)
            .send()
            .await
            .map_err(TallyError::from_reqwest)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(TallyError::from_reqwest)?;

        Ok(TallyResponse {
            status,
            headers,
            body,
        })
    }

    async fn subscribe(&self, url: &str, request: TallyRequest) -> Result<Subscription> {
        let response = self
            .build(url, &request)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(TallyError::from_reqwest)?;

        let status = response.status();
        tracing::info!("[TallyHTTP-Sub] GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(TallyError::InvalidSubscriptionStatus(status.as_u16()));
        }

        let (tx, rx) = async_channel::bounded(100);
        let mut stream = response.bytes_stream();

        let reader = tokio::spawn(async move {
            let mut parser = EventParser::new();

            while let Some(chunk_res) = stream.next().await {
                let chunk = match chunk_res {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!("[TallyHTTP-Sub] Stream error: {}", e);
                        let _ = tx.send(Err(TallyError::Http(e.to_string()))).await;
                        return;
                    }
                };
                tracing::trace!("[TallyHTTP-Sub] Received chunk of {} bytes", chunk.len());

                let items = match parser.feed(&chunk) {
                    Ok(events) => events.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                };
                for item in items {
                    if tx.send(item).await.is_err() {
                        tracing::debug!("[TallyHTTP-Sub] Receiver closed, dropping connection");
                        return;
                    }
                }
            }
            tracing::debug!("[TallyHTTP-Sub] Stream ended");
        });

        Ok(Subscription::new(rx).with_reader(reader))
    }
}
