//! Chat backend for a Gemini-powered assistant with optional voice replies
//!
//! Exposes two stateless proxy endpoints: `/api/chat` forwards the latest
//! conversation turn (text and/or inline image) to Gemini, and
//! `/api/text-to-speech` converts reply text to audio through ElevenLabs.
//! The `client` module holds the view-state controller that drives them.

pub mod ai;
pub mod app;
pub mod client;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
