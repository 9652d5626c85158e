use super::{ChatService, SpeechService};
use crate::models::ChatMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted failure returned by the mocks.
#[derive(Debug, Clone)]
pub struct MockFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl MockFailure {
    fn to_error(&self) -> Error {
        Error::upstream(self.status, self.message.clone())
    }
}

#[derive(Clone)]
pub struct MockChatClient {
    replies: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
    received: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            received: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_reply(self, reply: String) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_failure(self, status: Option<u16>, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(MockFailure { status, message });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Conversations passed to `reply`, in call order.
    pub fn get_received(&self) -> Vec<Vec<ChatMessage>> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.received.lock().unwrap().push(messages.to_vec());

        if let Some(failure) = self.failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            // Default mock response echoes the last message
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            Ok(format!("You said: {}", last))
        } else {
            let index = (*count - 1) % replies.len();
            Ok(replies[index].clone())
        }
    }
}

#[derive(Clone)]
pub struct MockSpeechClient {
    audio: Arc<Mutex<Vec<u8>>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self {
            // ID3 header followed by an MPEG frame sync
            audio: Arc::new(Mutex::new(vec![0x49, 0x44, 0x33, 0x04, 0x00, 0xFF, 0xFB])),
            failure: Arc::new(Mutex::new(None)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_audio(self, audio: Vec<u8>) -> Self {
        *self.audio.lock().unwrap() = audio;
        self
    }

    pub fn with_failure(self, status: Option<u16>, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(MockFailure { status, message });
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn get_received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for MockSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.received.lock().unwrap().push(text.to_string());

        if let Some(failure) = self.failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        Ok(self.audio.lock().unwrap().clone())
    }
}
