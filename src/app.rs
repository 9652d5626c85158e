//! Application wiring: builds the upstream clients from configuration and
//! serves the proxy router.

use crate::ai::{ChatService, ElevenLabsSpeechClient, GeminiChatClient, SpeechService};
use crate::models::Config;
use crate::server::{self, AppState};
use crate::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the shared proxy state and the listen configuration.
pub struct App {
    state: Arc<AppState>,
    config: Config,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
///
/// A `None` service means its API key is not configured; the matching
/// endpoint answers with a configuration error.
#[derive(Default)]
pub struct AppServices {
    pub chat: Option<Arc<dyn ChatService>>,
    pub speech: Option<Arc<dyn SpeechService>>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, config: Config) -> Self {
        Self {
            state: Arc::new(AppState {
                chat: services.chat,
                speech: services.speech,
            }),
            config,
        }
    }

    /// Construct the upstream clients from configuration.
    pub fn from_config(config: Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let chat = match &config.gemini_api_key {
            Some(api_key) => {
                info!("Chat provider: Gemini (model: {})", config.gemini_model);
                Some(Arc::new(GeminiChatClient::new_with_client(
                    api_key.clone(),
                    config.gemini_model.clone(),
                    http_client.clone(),
                )) as Arc<dyn ChatService>)
            }
            None => {
                warn!("GEMINI_API_KEY not set; /api/chat will report a configuration error");
                None
            }
        };

        let speech = match &config.eleven_labs_api_key {
            Some(api_key) => {
                info!(
                    "Speech provider: ElevenLabs (voice: {})",
                    config.eleven_labs_voice_id
                );
                Some(Arc::new(ElevenLabsSpeechClient::new_with_client(
                    api_key.clone(),
                    config.eleven_labs_voice_id.clone(),
                    http_client,
                )) as Arc<dyn SpeechService>)
            }
            None => {
                warn!(
                    "ELEVEN_LABS_API_KEY not set; /api/text-to-speech will report a configuration error"
                );
                None
            }
        };

        Self::with_services(AppServices { chat, speech }, config)
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn router(&self) -> axum::Router {
        server::router(self.state.clone(), self.config.max_body_bytes)
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid listen address {}:{}: {}",
                    self.config.host, self.config.port, e
                ))
            })
    }

    /// Bind the listener and serve until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let addr = self.addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("gemini-chat listening on {}", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
