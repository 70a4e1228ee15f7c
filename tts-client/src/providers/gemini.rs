//! Gemini speech generation engine
//!
//! Gemini accepts plain text only and answers with raw 16-bit PCM, so each
//! response is wrapped in a WAV header before it is returned.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, request_error};
use crate::engine::{InputFormat, SpeechEngine};
use crate::error::{Result, TtsError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const ENGINE_NAME: &str = "Gemini TTS";

/// PCM layout Gemini returns
pub const PCM_SAMPLE_RATE: u32 = 24_000;
pub const PCM_CHANNELS: u16 = 1;
pub const PCM_BITS_PER_SAMPLE: u16 = 16;

/// Engine for Gemini voices (plain text input, PCM output)
pub struct GeminiEngine {
    api_key: String,
    endpoint: String,
    voice_name: String,
    style: Option<String>,
    client: Client,
}

impl GeminiEngine {
    /// Create a new Gemini engine for one prebuilt voice
    pub fn new(api_key: String, voice_name: &str, style: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: generate_url(GEMINI_BASE_URL),
            voice_name: voice_name.to_string(),
            style,
            client: Client::new(),
        }
    }

    /// Use a different models base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.endpoint = generate_url(base_url);
        self
    }

    /// Gemini has no separate instruction channel for speech, so the style
    /// goes in front of the text itself.
    fn prompt(&self, text: &str) -> String {
        match self.style.as_deref().map(str::trim) {
            Some(style) if !style.is_empty() => format!("{}\n\n{}", style, text),
            _ => text.to_string(),
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &self.voice_name,
                        },
                    },
                },
            },
        }
    }
}

fn generate_url(base_url: &str) -> String {
    format!(
        "{}/{}:generateContent",
        base_url.trim_end_matches('/'),
        GEMINI_TTS_MODEL
    )
}

// Gemini request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
}

/// Pull the PCM payload out of `candidates[0].content.parts[0].inlineData.data`.
fn parse_response(body: &str) -> Result<Vec<u8>> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| TtsError::InvalidResponse(format!("{} response: {}", ENGINE_NAME, e)))?;

    let inline_data = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.inline_data.as_ref())
        .ok_or_else(|| {
            TtsError::InvalidResponse(format!("{} response has no inline audio", ENGINE_NAME))
        })?;

    if inline_data.data.is_empty() {
        return Err(TtsError::EmptyAudio {
            engine: ENGINE_NAME,
        });
    }

    Ok(STANDARD.decode(&inline_data.data)?)
}

/// Wrap raw PCM samples in a canonical 44-byte WAV header.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Vec<u8>> {
    let data_size = u32::try_from(pcm.len())
        .ok()
        .filter(|size| *size <= u32::MAX - 36)
        .ok_or_else(|| TtsError::InvalidResponse("PCM payload too large for WAV".to_string()))?;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm);
    Ok(wav)
}

#[async_trait]
impl SpeechEngine for GeminiEngine {
    async fn synthesize_one(&self, unit: &str) -> Result<Vec<u8>> {
        let prompt = self.prompt(unit);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .timeout(REQUEST_TIMEOUT)
            .json(&self.request_body(&prompt))
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, ENGINE_NAME).await);
        }

        let body = response.text().await.map_err(request_error)?;
        let pcm = parse_response(&body)?;
        debug!("{}: received {} bytes of PCM", ENGINE_NAME, pcm.len());
        pcm_to_wav(&pcm, PCM_SAMPLE_RATE, PCM_CHANNELS, PCM_BITS_PER_SAMPLE)
    }

    fn input_format(&self) -> InputFormat {
        InputFormat::PlainText
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }
}
