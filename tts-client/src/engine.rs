use async_trait::async_trait;
use log::{debug, error, warn};
use std::time::Duration;

use crate::error::{Result, TtsError};

/// Share of the engine's requests-per-minute quota a single job may use, in percent.
pub const QUOTA_HEADROOM_PERCENT: u64 = 80;

/// Fixed wait before the single retry of a failed unit.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// What kind of text an engine accepts for each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A complete `<speak>` document.
    Ssml,
    /// Plain narration text, no markup.
    PlainText,
}

/// Delays applied by [`SpeechEngine::synthesize_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Wait between two consecutive units
    pub delay: Duration,
    /// Wait before retrying a failed unit
    pub retry_backoff: Duration,
}

impl Pacing {
    /// Pace requests at 80% of a requests-per-minute quota:
    /// `delay = 60 / (quota_rpm * 0.8)` seconds.
    pub fn for_quota(quota_rpm: u32) -> Self {
        let rpm = u64::from(quota_rpm.max(1));
        let delay_us = 60_000_000 * 100 / (rpm * QUOTA_HEADROOM_PERCENT);
        Self {
            delay: Duration::from_micros(delay_us),
            retry_backoff: RETRY_BACKOFF,
        }
    }

    /// No delays at all. Useful for local engines and tests.
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            retry_backoff: Duration::ZERO,
        }
    }
}

/// Progress callback, invoked as `(completed, total)`.
pub type ProgressFn<'a> = dyn FnMut(usize, usize) + Send + 'a;

/// Trait for remote speech engines
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Synthesize one unit and return the bytes of a complete WAV container.
    async fn synthesize_one(&self, unit: &str) -> Result<Vec<u8>>;

    /// Synthesize every unit in order, one request at a time.
    ///
    /// A failed unit is retried once after `pacing.retry_backoff`. A second
    /// failure aborts the whole batch with [`TtsError::ChunkFailed`] and no
    /// later unit is requested.
    async fn synthesize_all(
        &self,
        units: &[String],
        pacing: &Pacing,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<Vec<u8>>> {
        synthesize_sequential(self, units, pacing, on_progress).await
    }

    /// The unit format this engine accepts
    fn input_format(&self) -> InputFormat;

    /// Get the engine name for display
    fn name(&self) -> &'static str;
}

async fn synthesize_sequential<E: SpeechEngine + ?Sized>(
    engine: &E,
    units: &[String],
    pacing: &Pacing,
    on_progress: &mut ProgressFn<'_>,
) -> Result<Vec<Vec<u8>>> {
    let total = units.len();
    let mut segments = Vec::with_capacity(total);

    for (index, unit) in units.iter().enumerate() {
        let position = index + 1;
        debug!(
            "{}: synthesizing chunk {}/{} ({} bytes)",
            engine.name(),
            position,
            total,
            unit.len()
        );

        let audio = match engine.synthesize_one(unit).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(
                    "{} failed on chunk {}/{}: {}",
                    engine.name(),
                    position,
                    total,
                    e
                );
                tokio::time::sleep(pacing.retry_backoff).await;
                engine.synthesize_one(unit).await.map_err(|retry_err| {
                    error!(
                        "Retry also failed on chunk {}/{}: {}",
                        position, total, retry_err
                    );
                    TtsError::ChunkFailed {
                        position,
                        total,
                        source: Box::new(retry_err),
                    }
                })?
            }
        };

        segments.push(audio);
        on_progress(position, total);

        if position < total && !pacing.delay.is_zero() {
            tokio::time::sleep(pacing.delay).await;
        }
    }

    Ok(segments)
}
