use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    HarmBlockThreshold, HarmCategory, InlineData, Part, SafetySetting,
};
use crate::ai::{ChatService, DataUri};
use crate::models::ChatMessage;
use crate::{prompts, Error, Result};
use async_trait::async_trait;

const TEMPERATURE: f64 = 0.1;
const TOP_K: u32 = 40;
const TOP_P: f64 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 2048;

const SAFETY_CATEGORIES: [HarmCategory; 4] = [
    HarmCategory::HarmCategoryHarassment,
    HarmCategory::HarmCategoryHateSpeech,
    HarmCategory::HarmCategorySexuallyExplicit,
    HarmCategory::HarmCategoryDangerousContent,
];

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

/// Build the content parts for the last turn of a conversation.
///
/// An image without text gets a default prompt so the model always sees at
/// least one text part. Text precedes the image.
pub fn build_parts(message: &ChatMessage) -> Result<Vec<Part>> {
    let text = message.content.trim();
    let image = message.image.as_deref().map(DataUri::parse).transpose()?;

    let mut parts = Vec::with_capacity(2);
    match (text.is_empty(), image.is_some()) {
        (true, false) => {
            return Err(Error::Validation(
                "Message must contain text or an image".to_string(),
            ));
        }
        (true, true) => parts.push(Part::Text {
            text: prompts::IMAGE_ONLY.to_string(),
        }),
        (false, _) => parts.push(Part::Text {
            text: text.to_string(),
        }),
    }

    if let Some(image) = image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                data: image.base64_payload(),
                mime_type: image.mime_type,
            },
        });
    }

    Ok(parts)
}

/// Build a single-turn generation request from the conversation.
///
/// Only the last message is sent; earlier turns are not forwarded.
pub fn build_request(messages: &[ChatMessage]) -> Result<GenerateContentRequest> {
    let last = messages
        .last()
        .ok_or_else(|| Error::Validation("Conversation has no messages".to_string()))?;

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: build_parts(last)?,
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
        safety_settings: SAFETY_CATEGORIES
            .iter()
            .map(|&category| SafetySetting {
                category,
                threshold: HarmBlockThreshold::BlockMediumAndAbove,
            })
            .collect(),
    })
}

/// Text of the first part of the first candidate, if every segment exists.
pub fn extract_reply(response: &GenerateContentResponse) -> Option<&str> {
    response
        .candidates
        .as_deref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_deref()?
        .first()?
        .text
        .as_deref()
}

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = build_request(messages)?;

        tracing::debug!(
            model = self.http.model(),
            parts = request.contents[0].parts.len(),
            history = messages.len(),
            "Sending generateContent request"
        );

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        match extract_reply(&response) {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::warn!("Gemini response carried no reply text; returning empty reply");
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    const PNG_URI: &str = "data:image/png;base64,iVBORw==";

    fn make_client(server: &MockServer, api_key: &str) -> GeminiChatClient {
        GeminiChatClient::new(api_key.to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn generate_content_mock() -> wiremock::MockBuilder {
        Mock::given(method("POST")).and(path(format!(
            "/v1beta/models/{}:generateContent",
            DEFAULT_MODEL
        )))
    }

    #[test]
    fn test_text_only_message_becomes_single_trimmed_part() {
        let parts = build_parts(&ChatMessage::user("  hello there \n", None)).unwrap();
        assert_eq!(
            parts,
            vec![Part::Text {
                text: "hello there".to_string()
            }]
        );
    }

    #[test]
    fn test_image_only_message_gets_default_prompt() {
        let parts = build_parts(&ChatMessage::user("   ", Some(PNG_URI.to_string()))).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0],
            Part::Text {
                text: prompts::IMAGE_ONLY.to_string()
            }
        );
        match &parts[1] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&inline_data.data)
                    .unwrap();
                assert_eq!(decoded, vec![0x89, 0x50, 0x4E, 0x47]);
            }
            other => panic!("expected inline data, got {:?}", other),
        }
    }

    #[test]
    fn test_text_and_image_keep_text_first() {
        let parts = build_parts(&ChatMessage::user(
            "what is this?",
            Some("data:image/webp;base64,UklGRg==".to_string()),
        ))
        .unwrap();
        assert!(matches!(&parts[0], Part::Text { text } if text == "what is this?"));
        assert!(
            matches!(&parts[1], Part::InlineData { inline_data } if inline_data.mime_type == "image/webp")
        );
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let err = build_parts(&ChatMessage::user(" \t", None)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_invalid_image_is_rejected() {
        let err = build_parts(&ChatMessage::user("hi", Some("not a uri".to_string()))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_request_uses_only_last_message() {
        let messages = vec![
            ChatMessage::user("first question", None),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("second question", None),
        ];
        let request = build_request(&messages).unwrap();
        assert_eq!(request.contents.len(), 1);
        assert_eq!(
            request.contents[0].parts,
            vec![Part::Text {
                text: "second question".to_string()
            }]
        );
    }

    #[test]
    fn test_request_serializes_generation_and_safety_settings() {
        let request = build_request(&[ChatMessage::user("hi", None)]).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["generationConfig"],
            json!({
                "temperature": 0.1,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 2048
            })
        );
        assert_eq!(
            value["safetySettings"],
            json!([
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
            ])
        );
        assert_eq!(value["contents"], json!([{ "parts": [{ "text": "hi" }] }]));
    }

    #[test]
    fn test_empty_conversation_is_rejected() {
        let err = build_request(&[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_extract_reply_handles_missing_segments() {
        let parse = |value: serde_json::Value| -> GenerateContentResponse {
            serde_json::from_value(value).unwrap()
        };

        let full = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "hello" }, { "text": "ignored" }] } }]
        }));
        assert_eq!(extract_reply(&full), Some("hello"));

        assert_eq!(extract_reply(&parse(json!({}))), None);
        assert_eq!(extract_reply(&parse(json!({ "candidates": [] }))), None);
        assert_eq!(extract_reply(&parse(json!({ "candidates": [{}] }))), None);
        assert_eq!(
            extract_reply(&parse(json!({ "candidates": [{ "content": { "parts": [] } }] }))),
            None
        );
        assert_eq!(
            extract_reply(&parse(json!({
                "candidates": [{ "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "AA==" } }] } }]
            }))),
            None
        );
    }

    #[tokio::test]
    async fn test_reply_parses_response_and_sends_key_as_query() {
        let server = MockServer::start().await;

        generate_content_mock()
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "Tell me a story" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Once upon a time" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let reply = client
            .reply(&[ChatMessage::user("Tell me a story", None)])
            .await
            .unwrap();
        assert_eq!(reply, "Once upon a time");
    }

    #[tokio::test]
    async fn test_reply_is_empty_when_candidates_missing() {
        let server = MockServer::start().await;

        generate_content_mock()
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let reply = client.reply(&[ChatMessage::user("hi", None)]).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_api_error_preserves_status_and_message() {
        let server = MockServer::start().await;

        generate_content_mock()
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "rate limited", "status": "RESOURCE_EXHAUSTED" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let err = client
            .reply(&[ChatMessage::user("hi", None)])
            .await
            .unwrap_err();

        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_api_error_without_json_uses_fallback_message() {
        let server = MockServer::start().await;

        generate_content_mock()
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let err = client
            .reply(&[ChatMessage::user("hi", None)])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "Failed to get response from Gemini");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_an_error() {
        let server = MockServer::start().await;

        generate_content_mock()
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"candidates\":["))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let err = client
            .reply(&[ChatMessage::user("hi", None)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn test_empty_message_never_reaches_upstream() {
        let server = MockServer::start().await;

        generate_content_mock()
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key");
        let err = client
            .reply(&[ChatMessage::user("", None)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
