//! One narration job: text in, single WAV out.
//!
//! `prepare_job` does every check that can fail without touching the network,
//! so bad input is rejected before the first request is sent. `run_job` then
//! synthesizes the prepared units and stitches the results.

use anyhow::{Context, Result};
use log::{debug, info};
use thiserror::Error;
use tts_client::{InputFormat, Pacing, ProgressFn, SpeechEngine};

use crate::audio;
use crate::text::chunker::SSML_OVERHEAD;
use crate::text::{TextChunker, build_ssml, normalize_markdown, prepare_plain_text};

pub const DEFAULT_MAX_CHUNKS: usize = 200;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 500_000;

/// Problems with the submitted text. These are safe to show to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Text is empty")]
    Empty,

    #[error("Text too long ({chars} characters). Maximum is {max}.")]
    TooLong { chars: usize, max: usize },

    #[error("No readable text found after processing")]
    NothingReadable,

    #[error("Text produced no chunks to synthesize")]
    NoChunks,

    #[error("Text needs {chunks} requests. Maximum is {max} per job.")]
    TooManyChunks { chunks: usize, max: usize },

    #[error("A passage renders to {bytes} bytes of speech markup and cannot be split below the {max}-byte request limit")]
    UnitTooLarge { bytes: usize, max: usize },
}

/// Size limits for a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobLimits {
    pub max_bytes_per_request: usize,
    pub max_chunks: usize,
    pub max_text_chars: usize,
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            max_bytes_per_request: crate::text::chunker::DEFAULT_MAX_BYTES,
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

/// Text that passed every check, rendered for one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedJob {
    /// Chunks with structural markers, as produced by the chunker
    pub chunks: Vec<String>,
    /// What is actually sent, one request per unit
    pub units: Vec<String>,
}

#[derive(Debug)]
pub struct JobOutput {
    /// One complete WAV file
    pub audio: Vec<u8>,
    pub duration_secs: f64,
    pub segments: usize,
}

/// Normalize, chunk and render `text` for an engine taking `format`.
pub fn prepare_job(text: &str, limits: &JobLimits, format: InputFormat) -> Result<PreparedJob> {
    if text.trim().is_empty() {
        return Err(InputError::Empty.into());
    }

    let chars = text.chars().count();
    if chars > limits.max_text_chars {
        return Err(InputError::TooLong {
            chars,
            max: limits.max_text_chars,
        }
        .into());
    }

    let normalized = normalize_markdown(text);
    if normalized.is_empty() {
        return Err(InputError::NothingReadable.into());
    }
    debug!(
        "Normalized {} input characters to {} bytes",
        chars,
        normalized.len()
    );

    let chunker = TextChunker::new(limits.max_bytes_per_request)?;
    let mut chunks = chunker.chunk(&normalized);

    let units: Vec<String> = match format {
        InputFormat::Ssml => {
            let mut fitted = Vec::with_capacity(chunks.len());
            let mut units = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                fit_ssml(chunk, limits.max_bytes_per_request, &mut fitted, &mut units)?;
            }
            chunks = fitted;
            units
        }
        // A chunk holding only a marker has nothing to say in plain text
        InputFormat::PlainText => chunks
            .iter()
            .map(|c| prepare_plain_text(c))
            .filter(|u| !u.is_empty())
            .collect(),
    };

    if chunks.is_empty() || units.is_empty() {
        return Err(InputError::NoChunks.into());
    }
    if chunks.len() > limits.max_chunks {
        return Err(InputError::TooManyChunks {
            chunks: chunks.len(),
            max: limits.max_chunks,
        }
        .into());
    }

    info!(
        "Prepared {} units (budget {} bytes per request)",
        units.len(),
        chunker.effective_max()
    );
    Ok(PreparedJob { chunks, units })
}

/// Render `chunk` as SSML, re-chunking it with a tighter budget while the
/// escaped markup is larger than `max_bytes`.
///
/// Each pass works on strictly shorter text, so this ends either with units
/// that fit or with a budget below the chunker's floor.
fn fit_ssml(
    chunk: String,
    max_bytes: usize,
    chunks: &mut Vec<String>,
    units: &mut Vec<String>,
) -> Result<()> {
    let unit = build_ssml(&chunk);
    if unit.len() <= max_bytes {
        chunks.push(chunk);
        units.push(unit);
        return Ok(());
    }

    let budget = chunk.len() * max_bytes / unit.len();
    debug!(
        "SSML unit is {} bytes for a {}-byte chunk, re-chunking at {} bytes",
        unit.len(),
        chunk.len(),
        budget
    );
    let chunker =
        TextChunker::new(budget + SSML_OVERHEAD).map_err(|_| InputError::UnitTooLarge {
            bytes: unit.len(),
            max: max_bytes,
        })?;

    for piece in chunker.chunk(&chunk) {
        fit_ssml(piece, max_bytes, chunks, units)?;
    }
    Ok(())
}

/// Synthesize every unit in order and stitch the segments into one WAV.
///
/// Nothing partial is returned: any unit that still fails after its retry
/// fails the job.
pub async fn run_job(
    engine: &dyn SpeechEngine,
    job: &PreparedJob,
    pacing: &Pacing,
    on_progress: &mut ProgressFn<'_>,
) -> Result<JobOutput> {
    let segments = engine
        .synthesize_all(&job.units, pacing, on_progress)
        .await
        .with_context(|| format!("{} synthesis failed", engine.name()))?;

    let count = segments.len();
    let audio = audio::stitch(segments).context("Failed to combine audio segments")?;

    // Duration is informational only
    let duration_secs = audio::inspect(&audio)
        .map(|info| info.duration_secs())
        .unwrap_or(0.0);

    Ok(JobOutput {
        audio,
        duration_secs,
        segments: count,
    })
}
