pub mod chat;
pub mod client;
pub mod types;

pub use chat::{build_request, extract_reply, GeminiChatClient};
pub use client::GeminiHttpClient;
