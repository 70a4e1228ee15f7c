//! Concatenate WAV segments into one file.
//!
//! The first segment's header is kept verbatim, extra chunks included. Only
//! its RIFF size and `data` size fields are rewritten. Every later segment
//! contributes just its sample bytes.

use log::debug;
use thiserror::Error;

use super::wav::{SegmentError, WavFormat, WavInfo, inspect};

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("No audio segments to concatenate")]
    NoSegments,

    #[error("Segment {index} is not usable: {source}")]
    Segment {
        index: usize,
        #[source]
        source: SegmentError,
    },

    #[error("Segment {index} is {found} but segment 0 is {expected}")]
    FormatMismatch {
        index: usize,
        expected: WavFormat,
        found: WavFormat,
    },

    #[error("Combined audio is too large for a WAV file ({0} bytes of samples)")]
    TooLarge(u64),
}

/// Join WAV segments in order.
///
/// A single segment is returned untouched without being parsed.
pub fn stitch(mut segments: Vec<Vec<u8>>) -> Result<Vec<u8>, StitchError> {
    match segments.len() {
        0 => Err(StitchError::NoSegments),
        1 => Ok(segments.pop().unwrap_or_default()),
        _ => stitch_many(&segments),
    }
}

fn stitch_many(segments: &[Vec<u8>]) -> Result<Vec<u8>, StitchError> {
    let infos = segments
        .iter()
        .enumerate()
        .map(|(index, bytes)| inspect_segment(index, bytes))
        .collect::<Result<Vec<_>, _>>()?;

    let first = infos[0];
    for (index, info) in infos.iter().enumerate().skip(1) {
        if !info.format.same_layout(&first.format) {
            return Err(StitchError::FormatMismatch {
                index,
                expected: first.format,
                found: info.format,
            });
        }
    }

    let total: u64 = infos.iter().map(|info| info.data_len() as u64).sum();
    let header_len = first.header_len();
    let data_size = u32::try_from(total).map_err(|_| StitchError::TooLarge(total))?;
    let riff_size = u32::try_from(header_len as u64 - 8 + total)
        .map_err(|_| StitchError::TooLarge(total))?;

    let mut out = Vec::with_capacity(header_len + data_size as usize);
    out.extend_from_slice(&segments[0][..header_len]);
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());
    let size_at = first.data.size_offset();
    out[size_at..size_at + 4].copy_from_slice(&data_size.to_le_bytes());

    for (bytes, info) in segments.iter().zip(&infos) {
        out.extend_from_slice(&bytes[info.data.body()]);
    }

    debug!(
        "Stitched {} segments: {} bytes of samples, {} total",
        segments.len(),
        total,
        out.len()
    );
    Ok(out)
}

fn inspect_segment(index: usize, bytes: &[u8]) -> Result<WavInfo, StitchError> {
    let info = inspect(bytes).map_err(|source| StitchError::Segment { index, source })?;
    if info.data.size == 0 {
        return Err(StitchError::Segment {
            index,
            source: SegmentError::EmptyData,
        });
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{mono_wav, wav, with_extra_chunk};

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_three_segments() {
        let segments = vec![mono_wav(100, 1), mono_wav(200, 2), mono_wav(150, 3)];
        let header = segments[0][..44].to_vec();

        let out = stitch(segments).unwrap();

        assert_eq!(out.len(), 494);
        assert_eq!(u32_at(&out, 4), 486);
        assert_eq!(u32_at(&out, 40), 450);
        // Header unchanged apart from the two size fields
        assert_eq!(&out[8..40], &header[8..40]);
        assert!(out[44..144].iter().all(|b| *b == 1));
        assert!(out[144..344].iter().all(|b| *b == 2));
        assert!(out[344..494].iter().all(|b| *b == 3));
    }

    #[test]
    fn test_result_is_valid_wav() {
        let out = stitch(vec![mono_wav(96, 0), mono_wav(48, 0)]).unwrap();
        let info = inspect(&out).unwrap();
        assert_eq!(info.data_len(), 144);
        assert!((info.duration_secs() - 0.003).abs() < 1e-9);
    }

    #[test]
    fn test_single_segment_passthrough() {
        // Not even a valid WAV: one segment is never parsed
        let only = b"anything at all".to_vec();
        assert_eq!(stitch(vec![only.clone()]).unwrap(), only);
    }

    #[test]
    fn test_no_segments() {
        assert!(matches!(stitch(Vec::new()), Err(StitchError::NoSegments)));
    }

    #[test]
    fn test_keeps_first_header_with_extra_chunk() {
        let first = with_extra_chunk(mono_wav(10, 7), b"LIST", b"INFO");
        let second = mono_wav(20, 9);

        let out = stitch(vec![first.clone(), second]).unwrap();

        let header_len = 44 + 12;
        assert_eq!(out.len(), header_len + 30);
        assert_eq!(&out[36..48], &first[36..48]);
        assert_eq!(u32_at(&out, 4), (header_len - 8 + 30) as u32);
        assert_eq!(u32_at(&out, header_len - 4), 30);
        assert!(out[header_len..header_len + 10].iter().all(|b| *b == 7));
        assert!(out[header_len + 10..].iter().all(|b| *b == 9));
    }

    #[test]
    fn test_later_extra_chunks_are_skipped() {
        let second = with_extra_chunk(mono_wav(20, 9), b"LIST", b"odd");
        let out = stitch(vec![mono_wav(10, 7), second]).unwrap();
        assert_eq!(out.len(), 44 + 30);
        assert!(out[54..].iter().all(|b| *b == 9));
    }

    #[test]
    fn test_invalid_segment_is_named() {
        let err = stitch(vec![mono_wav(10, 0), b"garbage".to_vec()]).unwrap_err();
        match err {
            StitchError::Segment { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, SegmentError::TooShort(7));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_data_rejected() {
        let err = stitch(vec![mono_wav(10, 0), mono_wav(0, 0)]).unwrap_err();
        assert!(matches!(
            err,
            StitchError::Segment {
                index: 1,
                source: SegmentError::EmptyData
            }
        ));
    }

    #[test]
    fn test_format_mismatch() {
        let err = stitch(vec![mono_wav(10, 0), mono_wav(10, 0), wav(44_100, 2, 16, 10, 0)])
            .unwrap_err();
        assert!(matches!(err, StitchError::FormatMismatch { index: 2, .. }));
        assert!(err.to_string().contains("44100 Hz, 2 ch"));
    }
}
