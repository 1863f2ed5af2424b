use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Output encoding requested from the backend.
///
/// Every segment of one artifact must share the same encoding so the segments
/// can be concatenated without re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    OggOpus,
    Linear16,
}

impl AudioEncoding {
    /// Parse an encoding name as accepted on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "ogg" | "opus" | "ogg-opus" | "ogg_opus" => Some(Self::OggOpus),
            "wav" | "linear16" | "pcm" => Some(Self::Linear16),
            _ => None,
        }
    }

    /// File extension for audio in this encoding
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggOpus => "ogg",
            Self::Linear16 => "wav",
        }
    }

    /// Name used by the Google Cloud Text-to-Speech API
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::OggOpus => "OGG_OPUS",
            Self::Linear16 => "LINEAR16",
        }
    }
}

/// Voice and audio settings applied to every synthesis call of one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Voice name (e.g. "en-US-Neural2-D"). None lets the backend pick.
    #[serde(default)]
    pub voice: Option<String>,
    /// BCP-47 language code
    pub language_code: String,
    pub encoding: AudioEncoding,
    /// Speaking rate (0.25-4.0, default 1.0)
    pub speaking_rate: f32,
    /// Pitch in semitones (-20.0-20.0, default 0.0)
    pub pitch: f32,
    /// Volume gain in dB (-96.0-16.0, default 0.0)
    pub volume_gain_db: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: None,
            language_code: "en-US".to_string(),
            encoding: AudioEncoding::Mp3,
            speaking_rate: 1.0,
            pitch: 0.0,
            volume_gain_db: 0.0,
        }
    }
}

impl SynthesisConfig {
    /// Create new synthesis settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voice name.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set the language code.
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    /// Set the output encoding.
    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the speaking rate.
    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.speaking_rate = rate.clamp(0.25, 4.0);
        self
    }

    /// Set the pitch.
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(-20.0, 20.0);
        self
    }

    /// Set the volume gain.
    pub fn with_volume_gain_db(mut self, gain: f32) -> Self {
        self.volume_gain_db = gain.clamp(-96.0, 16.0);
        self
    }
}

/// Speech synthesis backend trait - all TTS engines implement this.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text into an encoded audio payload.
    async fn synthesize(&self, text: &str, config: &SynthesisConfig) -> Result<Vec<u8>>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is usable (API key set, etc.)
    fn is_available(&self) -> Result<()>;
}
