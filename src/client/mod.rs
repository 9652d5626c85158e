//! Client-side view state for the chat front-end
//!
//! Holds the conversation controller, theme preference, voice playback state
//! and an HTTP client for the proxy endpoints.

pub mod api;
pub mod playback;
pub mod session;
pub mod theme;

pub use api::ProxyClient;
pub use playback::{PlaybackAction, VoicePlayback};
pub use session::ChatSession;
pub use theme::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Theme, ThemeSettings};
