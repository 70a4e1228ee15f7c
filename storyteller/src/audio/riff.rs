//! Bounds-checked walking of RIFF chunks.

use std::ops::Range;
use thiserror::Error;

/// `RIFF` + size + form type.
pub const RIFF_HEADER_LEN: usize = 12;

const CHUNK_HEADER_LEN: usize = 8;

/// One chunk found in a RIFF buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffChunk {
    pub id: [u8; 4],
    /// Offset of the chunk's id within the buffer
    pub offset: usize,
    pub size: u32,
}

impl RiffChunk {
    pub fn body(&self) -> Range<usize> {
        let start = self.offset + CHUNK_HEADER_LEN;
        start..start + self.size as usize
    }

    /// Offset of the little-endian size field.
    pub fn size_offset(&self) -> usize {
        self.offset + 4
    }

    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiffError {
    #[error("'{id}' chunk at offset {offset} declares {size} bytes but only {available} remain")]
    Truncated {
        id: String,
        offset: usize,
        size: u32,
        available: usize,
    },
}

/// Iterator over the chunks of a RIFF buffer.
///
/// Stops once fewer than 8 bytes remain. A chunk whose declared size runs
/// past the end of the buffer yields an error and ends the walk.
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

/// Walk chunks starting at `start` (usually [`RIFF_HEADER_LEN`]).
pub fn chunks(data: &[u8], start: usize) -> Chunks<'_> {
    Chunks {
        data,
        pos: start,
        done: false,
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<RiffChunk, RiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let header = match self.data.get(self.pos..self.pos + CHUNK_HEADER_LEN) {
            Some(header) => header,
            None => {
                self.done = true;
                return None;
            }
        };

        let id = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let chunk = RiffChunk {
            id,
            offset: self.pos,
            size,
        };

        let available = self.data.len() - (self.pos + CHUNK_HEADER_LEN);
        if size as usize > available {
            self.done = true;
            return Some(Err(RiffError::Truncated {
                id: chunk.id_str(),
                offset: self.pos,
                size,
                available,
            }));
        }

        // Odd-sized chunks are followed by a pad byte
        self.pos = chunk.body().end + size as usize % 2;
        Some(Ok(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{mono_wav, with_extra_chunk};

    fn find_chunk(data: &[u8], id: &[u8; 4]) -> Result<Option<RiffChunk>, RiffError> {
        for chunk in chunks(data, RIFF_HEADER_LEN) {
            let chunk = chunk?;
            if &chunk.id == id {
                return Ok(Some(chunk));
            }
        }
        Ok(None)
    }

    #[test]
    fn test_walks_canonical_wav() {
        let wav = mono_wav(10, 0);
        let found: Vec<_> = chunks(&wav, RIFF_HEADER_LEN)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(&found[0].id, b"fmt ");
        assert_eq!(found[0].offset, 12);
        assert_eq!(found[0].size, 16);
        assert_eq!(&found[1].id, b"data");
        assert_eq!(found[1].offset, 36);
        assert_eq!(found[1].body(), 44..54);
        assert_eq!(found[1].size_offset(), 40);
    }

    #[test]
    fn test_skips_pad_byte_after_odd_chunk() {
        let wav = with_extra_chunk(mono_wav(4, 0), b"LIST", b"abc");
        let data = find_chunk(&wav, b"data").unwrap().unwrap();
        // LIST header 8 + body 3 + pad 1
        assert_eq!(data.offset, 36 + 12);
        assert_eq!(data.size, 4);
    }

    #[test]
    fn test_missing_chunk() {
        let wav = mono_wav(4, 0);
        assert_eq!(find_chunk(&wav, b"LIST").unwrap(), None);
    }

    #[test]
    fn test_truncated_chunk_is_error() {
        let mut wav = mono_wav(4, 0);
        wav[40..44].copy_from_slice(&1000u32.to_le_bytes());
        let err = find_chunk(&wav, b"data").unwrap_err();
        assert_eq!(
            err,
            RiffError::Truncated {
                id: "data".to_string(),
                offset: 36,
                size: 1000,
                available: 4,
            }
        );
    }

    #[test]
    fn test_trailing_bytes_end_walk() {
        let mut wav = mono_wav(4, 0);
        wav.extend_from_slice(&[1, 2, 3]);
        let count = chunks(&wav, RIFF_HEADER_LEN).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(chunks(&[], RIFF_HEADER_LEN).count(), 0);
        assert_eq!(find_chunk(b"RIFF", b"data").unwrap(), None);
    }
}
