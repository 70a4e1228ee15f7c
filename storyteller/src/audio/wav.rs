//! WAV header inspection.

use std::fmt;
use thiserror::Error;

use super::riff::{RIFF_HEADER_LEN, RiffChunk, RiffError, chunks};

/// Shortest buffer that can hold a RIFF header, a `fmt ` chunk and a `data` header.
pub const MIN_WAV_LEN: usize = 44;

const FMT_MIN_SIZE: u32 = 16;

/// Sample layout from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// True when raw sample bytes of the two formats can be appended.
    pub fn same_layout(&self, other: &WavFormat) -> bool {
        self.audio_format == other.audio_format
            && self.channels == other.channels
            && self.sample_rate == other.sample_rate
            && self.bits_per_sample == other.bits_per_sample
            && self.block_align == other.block_align
    }

    fn parse(body: &[u8]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([body[i], body[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([body[i], body[i + 1], body[i + 2], body[i + 3]]);
        Self {
            audio_format: u16_at(0),
            channels: u16_at(2),
            sample_rate: u32_at(4),
            byte_rate: u32_at(8),
            block_align: u16_at(12),
            bits_per_sample: u16_at(14),
        }
    }
}

impl fmt::Display for WavFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// What a WAV buffer holds and where its samples live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format: WavFormat,
    pub data: RiffChunk,
}

impl WavInfo {
    /// Everything up to the first sample byte, `data` chunk header included.
    pub fn header_len(&self) -> usize {
        self.data.body().start
    }

    pub fn data_len(&self) -> usize {
        self.data.size as usize
    }

    /// Playback length; zero when the header reports no byte rate.
    pub fn duration_secs(&self) -> f64 {
        if self.format.byte_rate == 0 {
            return 0.0;
        }
        f64::from(self.data.size) / f64::from(self.format.byte_rate)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("too short to be a WAV file ({0} bytes)")]
    TooShort(usize),

    #[error("not a RIFF/WAVE file")]
    NotWave,

    #[error("no '{0}' chunk")]
    MissingChunk(&'static str),

    #[error("'fmt ' chunk is only {0} bytes")]
    ShortFormat(u32),

    #[error("'data' chunk is empty")]
    EmptyData,

    #[error(transparent)]
    Riff(#[from] RiffError),
}

/// Validate a WAV buffer and locate its format and sample data.
pub fn inspect(bytes: &[u8]) -> Result<WavInfo, SegmentError> {
    if bytes.len() < MIN_WAV_LEN {
        return Err(SegmentError::TooShort(bytes.len()));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(SegmentError::NotWave);
    }

    let mut format = None;
    let mut data = None;

    for chunk in chunks(bytes, RIFF_HEADER_LEN) {
        let chunk = chunk?;
        match &chunk.id {
            b"fmt " if format.is_none() => {
                if chunk.size < FMT_MIN_SIZE {
                    return Err(SegmentError::ShortFormat(chunk.size));
                }
                format = Some(WavFormat::parse(&bytes[chunk.body()]));
            }
            b"data" if data.is_none() => data = Some(chunk),
            _ => {}
        }
        if format.is_some() && data.is_some() {
            break;
        }
    }

    let format = format.ok_or(SegmentError::MissingChunk("fmt "))?;
    let data = data.ok_or(SegmentError::MissingChunk("data"))?;
    Ok(WavInfo { format, data })
}
