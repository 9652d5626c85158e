pub mod client;

pub use client::ElevenLabsSpeechClient;
