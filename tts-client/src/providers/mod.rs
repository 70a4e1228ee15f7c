//! Speech engine implementations

mod cloud_tts;
mod gemini;
pub mod mock;

pub use cloud_tts::CloudTtsEngine;
pub use gemini::{GeminiEngine, PCM_BITS_PER_SAMPLE, PCM_CHANNELS, PCM_SAMPLE_RATE, pcm_to_wav};
pub use mock::MockEngine;

use log::error;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::config::EngineSettings;
use crate::engine::SpeechEngine;
use crate::error::{Result, TtsError};
use crate::voices::{EngineKind, Voice};

impl EngineKind {
    /// Get the environment variable name for this engine's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::CloudTts => "GOOGLE_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CloudTts => "Cloud TTS",
            Self::Gemini => "Gemini TTS",
        }
    }
}

/// Create the engine that serves `voice`
pub fn create_engine(settings: &EngineSettings, voice: &Voice) -> Result<Box<dyn SpeechEngine>> {
    let kind = voice.engine();

    match kind {
        EngineKind::CloudTts => {
            let api_key = get_api_key(settings.google_api_key.as_deref(), kind)?;
            let mut engine = CloudTtsEngine::new(api_key, voice.api_name, settings);
            if let Some(endpoint) = &settings.cloud_endpoint {
                engine = engine.with_endpoint(endpoint);
            }
            Ok(Box::new(engine))
        }
        EngineKind::Gemini => {
            let api_key = get_api_key(settings.gemini_api_key.as_deref(), kind)?;
            let mut engine = GeminiEngine::new(api_key, voice.api_name, settings.style.clone());
            if let Some(base_url) = &settings.gemini_base_url {
                engine = engine.with_base_url(base_url);
            }
            Ok(Box::new(engine))
        }
    }
}

/// Get API key from settings or environment variable
fn get_api_key(configured: Option<&str>, kind: EngineKind) -> Result<String> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(kind.env_var())
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| TtsError::MissingApiKey {
            engine: kind.display_name().to_string(),
            env_var: kind.env_var().to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Convert a non-success response into an error, logging the upstream detail.
async fn error_from_response(response: Response, engine: &'static str) -> TtsError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_parts(status, &body, engine)
}

/// Map a status and body to an error, preferring the `{error:{message}}` text.
fn error_from_parts(status: StatusCode, body: &str, engine: &'static str) -> TtsError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error_response) => error_response.error.message,
        Err(_) => body.to_string(),
    };

    error!("{} API error ({}): {}", engine, status.as_u16(), message);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return TtsError::RateLimited { message };
    }

    TtsError::Api {
        message,
        status_code: Some(status.as_u16()),
    }
}

fn request_error(e: reqwest::Error) -> TtsError {
    TtsError::Api {
        message: format!("Request failed: {}", e),
        status_code: None,
    }
}
