//! ElevenLabs text-to-speech client.
//!
//! Posts text to `/v1/text-to-speech/{voice_id}` and buffers the whole MP3
//! response body.

use crate::ai::SpeechService;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const MODEL_ID: &str = "eleven_monolingual_v1";
const STABILITY: f64 = 0.5;
const SIMILARITY_BOOST: f64 = 0.5;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

pub struct ElevenLabsSpeechClient {
    client: Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsSpeechClient {
    pub fn new(api_key: String, voice_id: String) -> Self {
        Self::new_with_client(api_key, voice_id, Client::new())
    }

    pub fn new_with_client(api_key: String, voice_id: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            voice_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }
}

#[async_trait]
impl SpeechService for ElevenLabsSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);

        let request = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        tracing::debug!(
            voice_id = %self.voice_id,
            chars = text.chars().count(),
            "Sending text-to-speech request to ElevenLabs"
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "audio/mpeg")
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to ElevenLabs: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("ElevenLabs API error (status {}): {}", status, error_text);
            return Err(Error::upstream(
                Some(status.as_u16()),
                format!("ElevenLabs API error: {}", error_text),
            ));
        }

        let audio = response.bytes().await?;
        tracing::debug!("ElevenLabs returned {} bytes of audio", audio.len());

        Ok(audio.to_vec())
    }
}
