//! Play/pause state for reading an assistant reply aloud.

use crate::ai::SpeechService;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing { audio: Vec<u8> },
}

/// What the front-end should do after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackAction {
    /// Start playing these MP3 bytes.
    Play(Vec<u8>),
    /// Stop the current audio.
    Pause,
    /// Fetching audio failed; nothing to play.
    Failed,
}

#[derive(Debug)]
pub struct VoicePlayback {
    state: PlaybackState,
}

impl Default for VoicePlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl VoicePlayback {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// Pause when playing, otherwise fetch speech for `text` and play it.
    pub async fn toggle(&mut self, speech: &dyn SpeechService, text: &str) -> PlaybackAction {
        if self.is_playing() {
            self.state = PlaybackState::Idle;
            return PlaybackAction::Pause;
        }

        match speech.synthesize(text).await {
            Ok(audio) => {
                self.state = PlaybackState::Playing {
                    audio: audio.clone(),
                };
                PlaybackAction::Play(audio)
            }
            Err(e) => {
                error!("Failed to play voice: {}", e);
                self.state = PlaybackState::Idle;
                PlaybackAction::Failed
            }
        }
    }

    /// The audio ended or errored on the output side.
    pub fn finished(&mut self) {
        self.state = PlaybackState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockSpeechClient;

    #[tokio::test]
    async fn test_toggle_plays_then_pauses() {
        let speech = MockSpeechClient::new().with_audio(vec![1, 2, 3]);
        let mut playback = VoicePlayback::new();

        let action = playback.toggle(&speech, "hello").await;
        assert_eq!(action, PlaybackAction::Play(vec![1, 2, 3]));
        assert!(playback.is_playing());

        let action = playback.toggle(&speech, "hello").await;
        assert_eq!(action, PlaybackAction::Pause);
        assert_eq!(*playback.state(), PlaybackState::Idle);

        // Pausing does not call the speech service again
        assert_eq!(speech.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_stays_idle() {
        let speech = MockSpeechClient::new().with_failure(Some(500), "down".to_string());
        let mut playback = VoicePlayback::new();

        assert_eq!(playback.toggle(&speech, "hello").await, PlaybackAction::Failed);
        assert!(!playback.is_playing());
    }

    #[tokio::test]
    async fn test_finished_returns_to_idle() {
        let speech = MockSpeechClient::new();
        let mut playback = VoicePlayback::new();

        playback.toggle(&speech, "hello").await;
        playback.finished();
        assert!(!playback.is_playing());

        assert!(matches!(
            playback.toggle(&speech, "again").await,
            PlaybackAction::Play(_)
        ));
        assert_eq!(speech.get_received(), vec!["hello", "again"]);
    }
}
