//! Request handlers for `/api/chat`, `/api/text-to-speech` and `/health`.

use super::error::{ChatApiError, SpeechApiError};
use super::AppState;
use crate::ai::DataUri;
use crate::models::{ChatMessage, ChatReply};
use crate::{Error, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const INVALID_MESSAGES: &str = "Invalid messages format";

pub async fn health() -> &'static str {
    "OK"
}

/// Chat proxy (`POST /api/chat`).
///
/// The API key check comes first so an unconfigured server never inspects
/// the body.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Json<ChatReply>, ChatApiError> {
    let request_id = Uuid::new_v4();

    let chat = state
        .chat
        .as_ref()
        .ok_or_else(|| Error::Config("Gemini API key not configured".to_string()))?;

    let body = body?;
    let messages = parse_messages(&body)?;
    validate_conversation(&messages)?;

    debug!(
        %request_id,
        history = messages.len(),
        has_image = messages.last().is_some_and(ChatMessage::has_image),
        "Chat request"
    );

    let reply = chat.reply(&messages).await?;

    info!(%request_id, reply_chars = reply.chars().count(), "Chat reply ready");
    Ok(Json(ChatReply { reply }))
}

/// Text-to-speech proxy (`POST /api/text-to-speech`).
pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Response, SpeechApiError> {
    let request_id = Uuid::new_v4();

    let body = body?;
    let value: Value = serde_json::from_slice(&body)?;
    let text = value
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::Validation("Text is required".to_string()))?;

    let speech = state
        .speech
        .as_ref()
        .ok_or_else(|| Error::Config("ElevenLabs API key is not configured".to_string()))?;

    debug!(%request_id, chars = text.chars().count(), "Text-to-speech request");

    let audio = speech.synthesize(text).await?;

    info!(%request_id, bytes = audio.len(), "Text-to-speech audio ready");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg")),
            (header::CONTENT_LENGTH, HeaderValue::from(audio.len())),
        ],
        audio,
    )
        .into_response())
}

/// Decode `{ "messages": [...] }`; anything else is a client error.
pub fn parse_messages(body: &[u8]) -> Result<Vec<ChatMessage>> {
    let invalid = || Error::Validation(INVALID_MESSAGES.to_string());

    let mut value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    let messages = value
        .get_mut("messages")
        .filter(|messages| messages.is_array())
        .map(Value::take)
        .ok_or_else(invalid)?;

    serde_json::from_value(messages).map_err(|_| invalid())
}

/// Reject conversations that would produce an empty upstream request.
pub fn validate_conversation(messages: &[ChatMessage]) -> Result<()> {
    let last = messages
        .last()
        .ok_or_else(|| Error::Validation("Conversation has no messages".to_string()))?;

    if !last.has_text() && !last.has_image() {
        return Err(Error::Validation(
            "Message must contain text or an image".to_string(),
        ));
    }

    if let Some(image) = &last.image {
        DataUri::parse(image)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_parse_messages_accepts_history() {
        let body = br#"{"messages":[
            {"role":"user","content":"hi"},
            {"role":"assistant","content":"hello"},
            {"role":"user","content":"","image":"data:image/png;base64,AA=="}
        ]}"#;
        let messages = parse_messages(body).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[2].has_image());
    }

    #[test]
    fn test_parse_messages_rejects_bad_shapes() {
        let bodies: [&[u8]; 6] = [
            b"not json",
            br#"{}"#,
            br#"{"messages":"hello"}"#,
            br#"{"messages":{"role":"user"}}"#,
            br#"{"messages":[{"content":"missing role"}]}"#,
            br#"[]"#,
        ];
        for body in bodies {
            let err = parse_messages(body).unwrap_err();
            assert_eq!(err.to_string(), INVALID_MESSAGES);
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_validate_conversation() {
        assert!(validate_conversation(&[]).is_err());
        assert!(validate_conversation(&[ChatMessage::user("  ", None)]).is_err());
        assert!(validate_conversation(&[ChatMessage::user("", Some("garbage".to_string()))]).is_err());
        assert!(validate_conversation(&[ChatMessage::user("hi", None)]).is_ok());
        assert!(validate_conversation(&[ChatMessage::user(
            "",
            Some("data:image/gif;base64,R0lGODlh".to_string())
        )])
        .is_ok());
    }

    #[test]
    fn test_only_last_message_is_validated() {
        let messages = vec![
            ChatMessage::user("", Some("garbage".to_string())),
            ChatMessage::user("fine", None),
        ];
        assert!(validate_conversation(&messages).is_ok());
    }
}
