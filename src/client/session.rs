//! Conversation view state: message list, input buffer, pending image and
//! the loading flag.
//!
//! A turn is split into [`ChatSession::begin_submit`] and
//! [`ChatSession::finish_submit`] so a front-end can render the loading
//! state between them; [`ChatSession::submit`] runs both around one call.

use crate::ai::ChatService;
use crate::models::ChatMessage;
use crate::Result;
use tracing::error;

/// Conversation starters offered while the conversation is empty.
pub const SAMPLE_QUESTIONS: [&str; 4] = [
    "What is Gemini AI?",
    "Tell me about machine learning",
    "Write a story",
    "Explain quantum computing",
];

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    input: String,
    pending_image: Option<String>,
    loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn pending_image(&self) -> Option<&str> {
        self.pending_image.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Stage a `data:` URI to go out with the next turn.
    pub fn attach_image(&mut self, data_uri: String) {
        self.pending_image = Some(data_uri);
    }

    pub fn clear_image(&mut self) {
        self.pending_image = None;
    }

    /// The most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::models::Role::Assistant)
    }

    /// Sample questions to show; empty once the conversation has started.
    pub fn sample_questions(&self) -> &'static [&'static str] {
        if self.messages.is_empty() {
            &SAMPLE_QUESTIONS
        } else {
            &[]
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && (!self.input.trim().is_empty() || self.pending_image.is_some())
    }

    /// Append the user's turn, clear the buffers and enter the loading state.
    ///
    /// Returns the full history to send, or `None` when there is nothing to
    /// send or a turn is already in flight.
    pub fn begin_submit(&mut self) -> Option<Vec<ChatMessage>> {
        if !self.can_submit() {
            return None;
        }

        let content = std::mem::take(&mut self.input);
        let image = self.pending_image.take();
        Some(self.start_turn(ChatMessage::user(content, image)))
    }

    fn start_turn(&mut self, message: ChatMessage) -> Vec<ChatMessage> {
        self.messages.push(message);
        self.input.clear();
        self.loading = true;
        self.messages.clone()
    }

    /// Record the outcome of an in-flight turn.
    ///
    /// A reply is appended as an assistant message; a failure is logged and
    /// the conversation is left as it was. Loading clears either way.
    pub fn finish_submit(&mut self, result: Result<String>) -> Result<String> {
        self.loading = false;

        match result {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                error!("Failed to get response: {}", e);
                Err(e)
            }
        }
    }

    /// Send the current input as one turn. `Ok(None)` means nothing was sent.
    pub async fn submit(&mut self, chat: &dyn ChatService) -> Result<Option<String>> {
        let Some(history) = self.begin_submit() else {
            return Ok(None);
        };

        let result = chat.reply(&history).await;
        self.finish_submit(result).map(Some)
    }

    /// Send one of [`Self::sample_questions`] as a text-only turn.
    ///
    /// `Ok(None)` when the index is not on offer or a turn is in flight. A
    /// pending image stays staged for the next typed turn.
    pub async fn submit_sample(
        &mut self,
        chat: &dyn ChatService,
        index: usize,
    ) -> Result<Option<String>> {
        let Some(question) = self.sample_questions().get(index).copied() else {
            return Ok(None);
        };
        if self.loading {
            return Ok(None);
        }

        let history = self.start_turn(ChatMessage::user(question, None));
        let result = chat.reply(&history).await;
        self.finish_submit(result).map(Some)
    }
}
