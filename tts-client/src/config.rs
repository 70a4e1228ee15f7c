/// Settings shared by every engine adapter.
///
/// Fields that only one engine understands are ignored by the other:
/// speaking rate and pitch go to Cloud TTS, the style instruction to Gemini.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Cloud TTS API key (falls back to `GOOGLE_API_KEY`)
    pub google_api_key: Option<String>,

    /// Gemini API key (falls back to `GEMINI_API_KEY`)
    pub gemini_api_key: Option<String>,

    /// BCP-47 language code sent with Cloud TTS voices
    pub language_code: String,

    /// Speaking rate (0.25-4.0)
    pub speaking_rate: f32,

    /// Pitch in semitones (-20.0-20.0)
    pub pitch: f32,

    /// Output sample rate requested from Cloud TTS
    pub sample_rate_hertz: u32,

    /// Style or mood instruction prefixed to Gemini input
    pub style: Option<String>,

    /// Custom Cloud TTS endpoint
    pub cloud_endpoint: Option<String>,

    /// Custom Gemini models base URL
    pub gemini_base_url: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_api_key: None,
            language_code: "en-US".to_string(),
            speaking_rate: 0.95,
            pitch: -2.0,
            sample_rate_hertz: 24_000,
            style: None,
            cloud_endpoint: None,
            gemini_base_url: None,
        }
    }
}

impl EngineSettings {
    /// Set the speaking rate, clamped to what Cloud TTS accepts.
    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.speaking_rate = rate.clamp(0.25, 4.0);
        self
    }

    /// Set the pitch, clamped to what Cloud TTS accepts.
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(-20.0, 20.0);
        self
    }

    /// Set the style instruction. Blank strings clear it.
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style.filter(|s| !s.trim().is_empty());
        self
    }
}
