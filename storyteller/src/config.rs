//! storyteller configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tts_client::{DEFAULT_VOICE, EngineSettings};

use crate::pipeline::{DEFAULT_MAX_CHUNKS, DEFAULT_MAX_TEXT_CHARS, JobLimits};
use crate::text::chunker::DEFAULT_MAX_BYTES;

const DEFAULT_SPEAKING_RATE: f32 = 0.95;
const DEFAULT_PITCH: f32 = -2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorytellerConfig {
    /// Default voice (API name, see `storyteller voices`)
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate (0.25-4.0)
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,

    /// Pitch in semitones (-20.0-20.0)
    #[serde(default = "default_pitch")]
    pub pitch: f32,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate_hertz: u32,

    /// Byte budget for one synthesis request
    #[serde(default = "default_max_bytes")]
    pub max_bytes_per_request: usize,

    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Style or mood instruction for Gemini voices
    #[serde(default)]
    pub style: Option<String>,

    /// Cloud TTS API key. GOOGLE_API_KEY is used when unset.
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Gemini API key. GEMINI_API_KEY is used when unset.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speaking_rate() -> f32 {
    DEFAULT_SPEAKING_RATE
}

fn default_pitch() -> f32 {
    DEFAULT_PITCH
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

impl Default for StorytellerConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            speaking_rate: default_speaking_rate(),
            pitch: default_pitch(),
            language_code: default_language_code(),
            sample_rate_hertz: default_sample_rate(),
            max_bytes_per_request: default_max_bytes(),
            max_chunks: default_max_chunks(),
            max_text_chars: default_max_text_chars(),
            style: None,
            google_api_key: None,
            gemini_api_key: None,
        }
    }
}

impl StorytellerConfig {
    /// Get the config file path: ~/.config/cli-programs/storyteller.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("storyteller.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: StorytellerConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Engine settings with rate and pitch clamped to accepted ranges.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            google_api_key: self.google_api_key.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            language_code: self.language_code.clone(),
            sample_rate_hertz: self.sample_rate_hertz,
            ..EngineSettings::default()
        }
        .with_speaking_rate(self.speaking_rate)
        .with_pitch(self.pitch)
        .with_style(self.style.clone())
    }

    pub fn job_limits(&self) -> JobLimits {
        JobLimits {
            max_bytes_per_request: self.max_bytes_per_request,
            max_chunks: self.max_chunks,
            max_text_chars: self.max_text_chars,
        }
    }
}
