//! Cloud Text-to-Speech engine
//!
//! Takes one SSML document per request and returns the LINEAR16 WAV bytes
//! the service produces, untouched.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, request_error};
use crate::config::EngineSettings;
use crate::engine::{InputFormat, SpeechEngine};
use crate::error::{Result, TtsError};

const CLOUD_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ENGINE_NAME: &str = "Cloud TTS";

/// Engine for Cloud TTS voices (SSML input, WAV output)
pub struct CloudTtsEngine {
    api_key: String,
    endpoint: String,
    voice: VoiceSelection,
    audio_config: AudioConfig,
    client: Client,
}

impl CloudTtsEngine {
    /// Create a new Cloud TTS engine for one voice
    pub fn new(api_key: String, voice_name: &str, settings: &EngineSettings) -> Self {
        Self {
            api_key,
            endpoint: CLOUD_TTS_URL.to_string(),
            voice: VoiceSelection {
                language_code: settings.language_code.clone(),
                name: voice_name.to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16".to_string(),
                speaking_rate: settings.speaking_rate,
                pitch: settings.pitch,
                sample_rate_hertz: settings.sample_rate_hertz,
            },
            client: Client::new(),
        }
    }

    /// Send requests somewhere other than the public endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn request_body<'a>(&'a self, ssml: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { ssml },
            voice: &self.voice,
            audio_config: &self.audio_config,
        }
    }
}

// Cloud TTS request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: &'a VoiceSelection,
    audio_config: &'a AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    ssml: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
    speaking_rate: f32,
    pitch: f32,
    sample_rate_hertz: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Decode the WAV bytes out of a successful response body.
fn parse_response(body: &str) -> Result<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| TtsError::InvalidResponse(format!("{} response: {}", ENGINE_NAME, e)))?;

    if response.audio_content.is_empty() {
        return Err(TtsError::EmptyAudio {
            engine: ENGINE_NAME,
        });
    }

    Ok(STANDARD.decode(response.audio_content)?)
}

#[async_trait]
impl SpeechEngine for CloudTtsEngine {
    async fn synthesize_one(&self, unit: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .timeout(REQUEST_TIMEOUT)
            .json(&self.request_body(unit))
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, ENGINE_NAME).await);
        }

        let body = response.text().await.map_err(request_error)?;
        let audio = parse_response(&body)?;
        debug!("{}: received {} bytes of audio", ENGINE_NAME, audio.len());
        Ok(audio)
    }

    fn input_format(&self) -> InputFormat {
        InputFormat::Ssml
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> CloudTtsEngine {
        let settings = EngineSettings::default()
            .with_speaking_rate(1.1)
            .with_pitch(0.5);
        CloudTtsEngine::new("key".to_string(), "en-US-Studio-Q", &settings)
    }

    #[test]
    fn test_request_body_shape() {
        let engine = engine();
        let body = serde_json::to_value(engine.request_body("<speak>Hi</speak>")).unwrap();
        assert_eq!(
            body,
            json!({
                "input": {"ssml": "<speak>Hi</speak>"},
                "voice": {"languageCode": "en-US", "name": "en-US-Studio-Q"},
                "audioConfig": {
                    "audioEncoding": "LINEAR16",
                    "speakingRate": 1.1f32,
                    "pitch": 0.5,
                    "sampleRateHertz": 24000
                }
            })
        );
    }

    #[test]
    fn test_parse_response_decodes_audio() {
        let body = json!({"audioContent": STANDARD.encode(b"RIFF....WAVE")}).to_string();
        assert_eq!(parse_response(&body).unwrap(), b"RIFF....WAVE");
    }

    #[test]
    fn test_parse_response_empty_audio() {
        let err = parse_response(r#"{"audioContent": ""}"#).unwrap_err();
        assert!(matches!(err, TtsError::EmptyAudio { .. }));

        let err = parse_response("{}").unwrap_err();
        assert!(matches!(err, TtsError::EmptyAudio { .. }));
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, TtsError::InvalidResponse(_)));

        let err = parse_response(r#"{"audioContent": "%%%"}"#).unwrap_err();
        assert!(matches!(err, TtsError::Decode(_)));
    }

    #[test]
    fn test_engine_metadata() {
        let engine = engine().with_endpoint("http://localhost:9999/synthesize");
        assert_eq!(engine.endpoint, "http://localhost:9999/synthesize");
        assert_eq!(engine.input_format(), InputFormat::Ssml);
        assert_eq!(engine.name(), "Cloud TTS");
    }
}
