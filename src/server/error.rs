//! HTTP error responses for the two proxies.
//!
//! Both wrap the crate [`Error`] but report it differently: the chat proxy
//! forwards the message and a `type` classification, while the speech proxy
//! only exposes validation and configuration messages and hides everything
//! else behind a fixed message. Full detail is always logged.

use crate::models::ErrorBody;
use crate::Error;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

const SPEECH_FAILURE: &str = "Failed to convert text to speech";

#[derive(Debug)]
pub struct ChatApiError(pub Error);

impl From<Error> for ChatApiError {
    fn from(e: Error) -> Self {
        ChatApiError(e)
    }
}

/// An unreadable or oversized body is the client's fault.
impl From<BytesRejection> for ChatApiError {
    fn from(rejection: BytesRejection) -> Self {
        ChatApiError(Error::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let kind = self.0.kind();

        error!(error = %self.0, status = status.as_u16(), kind, "Chat request failed");

        let body = ErrorBody {
            error: self.0.to_string(),
            error_type: Some(kind.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug)]
pub struct SpeechApiError(pub Error);

impl From<Error> for SpeechApiError {
    fn from(e: Error) -> Self {
        SpeechApiError(e)
    }
}

impl From<serde_json::Error> for SpeechApiError {
    fn from(e: serde_json::Error) -> Self {
        SpeechApiError(Error::Serialization(e))
    }
}

impl From<BytesRejection> for SpeechApiError {
    fn from(rejection: BytesRejection) -> Self {
        SpeechApiError(Error::Generic(rejection.body_text()))
    }
}

impl IntoResponse for SpeechApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Error::Config(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, SPEECH_FAILURE.to_string()),
        };

        error!(error = %self.0, status = status.as_u16(), "Text-to-speech error");

        let body = ErrorBody {
            error: message,
            error_type: None,
        };
        (status, Json(body)).into_response()
    }
}
