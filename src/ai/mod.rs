//! AI service integration for chat replies and speech synthesis
//!
//! Provides the Gemini `generateContent` client used by the chat proxy and
//! the ElevenLabs text-to-speech client used by the speech proxy, behind
//! provider-neutral traits so handlers and the client controller can be
//! driven by mocks.

pub mod data_uri;
pub mod elevenlabs;
pub mod gemini;
pub mod mime;
pub mod mock;

pub use data_uri::DataUri;
pub use elevenlabs::ElevenLabsSpeechClient;
pub use gemini::GeminiChatClient;
pub use mock::{MockChatClient, MockSpeechClient};

use crate::models::ChatMessage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produce the assistant reply for a conversation.
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Convert text to encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
