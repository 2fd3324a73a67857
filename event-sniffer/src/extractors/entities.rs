//! HTTP client for the entity extraction service.
//!
//! Request: `POST {"text": "..."}`. Response: `{"entities": [{"text", "label"}]}`.
//! Every failure (transport, status, body shape) degrades to zero entities.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::EntitySource;
use crate::types::Entity;

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    entities: Vec<Entity>,
}

/// Parse a response body into entities.
///
/// Anything other than an object with an `entities` array of
/// `{text, label}` objects yields an empty vector.
pub fn parse_response(body: &str) -> Vec<Entity> {
    match serde_json::from_str::<ParseResponse>(body) {
        Ok(response) => response.entities,
        Err(e) => {
            warn!("Malformed extraction service response: {}", e);
            Vec::new()
        }
    }
}

/// One-shot client for the extraction service.
pub struct EntityClient {
    client: Client,
    endpoint: String,
}

impl EntityClient {
    /// Create a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl EntitySource for EntityClient {
    async fn extract_entities(&self, text: &str) -> Vec<Entity> {
        debug!("Sending {} chars to {}", text.len(), self.endpoint);

        let response = match self
            .client
            .post(&self.endpoint)
            .json(&ParseRequest { text })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                warn!(
                    "Could not connect to the extraction service at {}; is it running? ({})",
                    self.endpoint, e
                );
                return Vec::new();
            }
            Err(e) if e.is_timeout() => {
                warn!("Extraction service timed out: {}", e);
                return Vec::new();
            }
            Err(e) => {
                warn!("Extraction request failed: {}", e);
                return Vec::new();
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Extraction service returned {}", status);
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read extraction service response: {}", e);
                return Vec::new();
            }
        };

        let entities = parse_response(&body);
        debug!("Extraction service returned {} entities", entities.len());
        entities
    }
}
