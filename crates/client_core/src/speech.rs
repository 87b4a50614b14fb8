use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// One recognised phrase from the speech recogniser.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub transcript: String,
    pub confidence: f32,
}

impl Utterance {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// Text-to-speech capability.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speaks `text` and resolves once playback has finished.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Interrupts any current utterance and starts `text` without waiting.
    fn speak_now(&self, text: &str);

    fn stop(&self);
}

/// Speech recognition capability. Recognised phrases are delivered to every
/// subscriber while listening is active.
pub trait SpeechInput: Send + Sync {
    /// Returns `false` when recognition is unavailable on this station.
    fn start(&self) -> bool;

    fn stop(&self);

    fn restart(&self) {
        self.stop();
        self.start();
    }

    fn subscribe(&self) -> broadcast::Receiver<Utterance>;
}
