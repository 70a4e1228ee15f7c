use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("API key not found for {engine}. Set {env_var} environment variable or add to config.")]
    MissingApiKey { engine: String, env_var: String },

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Rate limit exceeded (HTTP 429): {message}")]
    RateLimited { message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Unexpected response format: {0}")]
    InvalidResponse(String),

    #[error("{engine} returned empty audio content")]
    EmptyAudio { engine: &'static str },

    #[error("Failed to decode audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Synthesis failed on chunk {position} of {total}")]
    ChunkFailed {
        position: usize,
        total: usize,
        #[source]
        source: Box<TtsError>,
    },
}

impl TtsError {
    /// Position and total of the failed unit, when the error came out of a batch.
    pub fn failed_chunk(&self) -> Option<(usize, usize)> {
        match self {
            Self::ChunkFailed {
                position, total, ..
            } => Some((*position, *total)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
