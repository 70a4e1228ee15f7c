//! Remote text-to-speech client library for the storyteller workspace
//!
//! Provides one interface over two engines:
//! - Cloud TTS (SSML in, WAV out)
//! - Gemini speech generation (plain text in, PCM wrapped as WAV out)
//!
//! Units are synthesized strictly one after another, paced to stay under the
//! engine's per-minute quota, with a single retry per unit.

pub mod config;
pub mod engine;
pub mod error;
pub mod providers;
pub mod voices;

pub use config::EngineSettings;
pub use engine::{InputFormat, Pacing, ProgressFn, SpeechEngine};
pub use error::{Result, TtsError};
pub use providers::{CloudTtsEngine, GeminiEngine, MockEngine, create_engine, pcm_to_wav};
pub use voices::{DEFAULT_VOICE, EngineKind, Voice, VoiceCategory, find_voice};
