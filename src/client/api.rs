//! HTTP client for the proxy endpoints.
//!
//! Implements the same service traits as the upstream clients, so the view
//! controller can talk to a running proxy or to Gemini/ElevenLabs directly.

use crate::ai::{ChatService, SpeechService};
use crate::models::{ChatMessage, ChatReply, ChatRequest, ErrorBody, TextToSpeechRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: String) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success proxy response to an [`Error::Upstream`] carrying
    /// the `error` field of its JSON body.
    async fn error_from(response: Response, fallback: &str) -> Error {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| fallback.to_string());
        Error::upstream(Some(status.as_u16()), message)
    }
}

#[async_trait]
impl ChatService for ProxyClient {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                messages: messages.to_vec(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "Failed to get response").await);
        }

        let body: ChatReply = response.json().await?;
        Ok(body.reply)
    }
}

#[async_trait]
impl SpeechService for ProxyClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/api/text-to-speech", self.base_url))
            .json(&TextToSpeechRequest {
                text: text.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "Failed to convert text to speech").await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}
