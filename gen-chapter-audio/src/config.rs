//! gen-chapter-audio configuration management.

use crate::text::segmenter::DEFAULT_MAX_SEGMENT_CHARS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tts_client::{AudioEncoding, ProviderConfig, SynthesisConfig};

// Default voice settings
const DEFAULT_LANGUAGE_CODE: &str = "en-US";
const DEFAULT_SPEAKING_RATE: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// Default voice name (None lets the backend choose for the language)
    #[serde(default)]
    pub voice: Option<String>,

    /// BCP-47 language code
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Output encoding (mp3, ogg-opus, linear16)
    #[serde(default)]
    pub encoding: AudioEncoding,

    /// Speaking rate (0.25-4.0)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,

    /// Pitch in semitones (-20.0-20.0)
    #[serde(default)]
    pub pitch: f32,

    /// Volume gain in dB (-96.0-16.0)
    #[serde(default)]
    pub volume_gain_db: f32,

    /// Character ceiling per synthesis request
    #[serde(default = "default_max_segment_chars")]
    pub max_segment_chars: usize,

    /// Directory for part files. None means the data directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Directory for finished artifacts. None means the current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// FFmpeg executable. None means `ffmpeg` on PATH.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Synthesis provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_language_code() -> String {
    DEFAULT_LANGUAGE_CODE.to_string()
}

fn default_speaking_rate() -> f32 {
    DEFAULT_SPEAKING_RATE
}

fn default_max_segment_chars() -> usize {
    DEFAULT_MAX_SEGMENT_CHARS
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            voice: None,
            language_code: default_language_code(),
            encoding: AudioEncoding::default(),
            speaking_rate: default_speaking_rate(),
            pitch: 0.0,
            volume_gain_db: 0.0,
            max_segment_chars: default_max_segment_chars(),
            work_dir: None,
            output_dir: None,
            ffmpeg_path: None,
            provider: ProviderConfig::default(),
        }
    }
}

impl GenConfig {
    /// Get the config file path: ~/.config/cli-programs/gen-chapter-audio.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("gen-chapter-audio.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: GenConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Voice settings for a build, with every value clamped to its valid range.
    pub fn synthesis_config(&self) -> SynthesisConfig {
        let config = SynthesisConfig::new()
            .with_language_code(self.language_code.clone())
            .with_encoding(self.encoding)
            .with_speaking_rate(self.speaking_rate)
            .with_pitch(self.pitch)
            .with_volume_gain_db(self.volume_gain_db);
        match &self.voice {
            Some(voice) => config.with_voice(voice.clone()),
            None => config,
        }
    }

    /// Working directory for part files.
    pub fn resolved_work_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.work_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("gen-chapter-audio").join("work"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    /// Output directory for artifacts.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
