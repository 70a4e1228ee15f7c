//! Text chunking for per-request synthesis budgets.
//!
//! Sizes are UTF-8 byte lengths, which is what the synthesis services count.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use super::SECTION_BREAK;

/// Default per-request byte budget.
pub const DEFAULT_MAX_BYTES: usize = 4800;

/// Bytes reserved for the SSML envelope and pause tags added after chunking.
pub const SSML_OVERHEAD: usize = 200;

/// Smallest usable budget: one marker plus a few words.
const MIN_EFFECTIVE_BYTES: usize = 64;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

static CLAUSE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:]\s+").expect("clause pattern is valid"));

/// Splits normalized text into chunks that each fit one synthesis request.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    effective_max: usize,
}

impl TextChunker {
    pub fn new(max_bytes: usize) -> Result<Self> {
        let effective_max = max_bytes.saturating_sub(SSML_OVERHEAD);
        if effective_max < MIN_EFFECTIVE_BYTES {
            bail!(
                "Byte budget {} is too small (must exceed {} bytes)",
                max_bytes,
                SSML_OVERHEAD + MIN_EFFECTIVE_BYTES - 1
            );
        }
        Ok(Self { effective_max })
    }

    /// Byte limit every chunk respects.
    pub fn effective_max(&self) -> usize {
        self.effective_max
    }

    /// Split `text` into ordered, trimmed, non-empty chunks.
    ///
    /// Section markers are kept as their own pieces so whole sections pack
    /// together when they fit. A section that is too big on its own is split
    /// at the coarsest boundary that works: paragraphs, then sentences, then
    /// clauses, then words.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for section in split_keeping_markers(text) {
            if section.is_empty() {
                continue;
            }

            if current.len() + section.len() <= self.effective_max {
                current.push_str(section);
                continue;
            }

            push_trimmed(&mut chunks, &current);

            if section.len() > self.effective_max {
                let mut pieces = self.split_oversized(section, Boundary::Paragraph);
                current = pieces.pop().unwrap_or_default();
                chunks.extend(pieces);
            } else {
                current = section.to_string();
            }
        }

        push_trimmed(&mut chunks, &current);
        chunks
    }

    fn split_oversized(&self, text: &str, from: Boundary) -> Vec<String> {
        let mut boundary = Some(from);

        while let Some(b) = boundary {
            let pieces = b.split(text);
            if pieces.len() > 1 {
                let mut out = Vec::new();
                for chunk in self.accumulate(&pieces, b.separator()) {
                    if chunk.len() <= self.effective_max {
                        out.push(chunk);
                    } else if let Some(finer) = b.finer() {
                        out.extend(self.split_oversized(&chunk, finer));
                    } else {
                        out.extend(hard_split(&chunk, self.effective_max));
                    }
                }
                return out;
            }
            boundary = b.finer();
        }

        hard_split(text.trim(), self.effective_max)
    }

    /// Greedily join pieces with `separator` while they fit.
    ///
    /// A single piece larger than the budget comes out on its own.
    fn accumulate(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for piece in pieces.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if current.is_empty() {
                current = piece.to_string();
            } else if current.len() + separator.len() + piece.len() <= self.effective_max {
                current.push_str(separator);
                current.push_str(piece);
            } else {
                chunks.push(std::mem::take(&mut current));
                current = piece.to_string();
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            effective_max: DEFAULT_MAX_BYTES - SSML_OVERHEAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Sentence,
    Clause,
    Word,
}

impl Boundary {
    fn finer(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Sentence),
            Self::Sentence => Some(Self::Clause),
            Self::Clause => Some(Self::Word),
            Self::Word => None,
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Paragraph => "\n\n",
            _ => " ",
        }
    }

    fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Paragraph => text.split("\n\n").collect(),
            Self::Sentence => split_after_punctuation(text, &SENTENCE_END),
            Self::Clause => split_after_punctuation(text, &CLAUSE_END),
            Self::Word => text.split_whitespace().collect(),
        }
    }
}

/// Split where `pattern` (one ASCII punctuation mark followed by whitespace)
/// matches, keeping the punctuation with the piece on its left.
fn split_after_punctuation<'a>(text: &'a str, pattern: &Regex) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for m in pattern.find_iter(text) {
        pieces.push(&text[last..m.start() + 1]);
        last = m.end();
    }
    pieces.push(&text[last..]);

    pieces
}

/// Split text around section markers, keeping each marker as its own piece.
fn split_keeping_markers(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for m in SECTION_BREAK.find_iter(text) {
        pieces.push(&text[last..m.start()]);
        pieces.push(m.as_str());
        last = m.end();
    }
    pieces.push(&text[last..]);

    pieces
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Hard split on character boundaries (last resort for a single huge word).
fn hard_split(text: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if !current.is_empty() && current.len() + c.len_utf8() > max_bytes {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(c);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn squash(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_effective_budget() {
        let chunker = TextChunker::new(4800).unwrap();
        assert_eq!(chunker.effective_max(), 4600);
        assert_eq!(TextChunker::default().effective_max(), 4600);
    }

    #[test]
    fn test_budget_too_small() {
        assert!(TextChunker::new(SSML_OVERHEAD).is_err());
        assert!(TextChunker::new(100).is_err());
        assert!(TextChunker::new(SSML_OVERHEAD + MIN_EFFECTIVE_BYTES).is_ok());
    }

    #[test]
    fn test_chunk_short_text() {
        let chunks = TextChunker::default().chunk("Hello world. How are you?");
        assert_eq!(chunks, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(TextChunker::default().chunk("").is_empty());
        assert!(TextChunker::default().chunk("   \n\n   ").is_empty());
    }

    #[test]
    fn test_sections_pack_together() {
        let text = "[SECTION_BREAK_1]Title\n\nIntro.\n\n[SECTION_BREAK_2]Part\n\nBody.";
        let chunks = TextChunker::default().chunk(text);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_sections_start_new_chunk_when_full() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 100).unwrap();
        let first = format!("[SECTION_BREAK_1]{}", "a".repeat(80));
        let second = format!("[SECTION_BREAK_2]{}", "b".repeat(60));
        let chunks = chunker.chunk(&format!("{}\n\n{}", first, second));
        assert_eq!(chunks, vec![first, second]);
    }

    #[test]
    fn test_split_at_paragraphs() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 100).unwrap();
        let para = "word ".repeat(12).trim().to_string();
        let text = format!("{}\n\n{}\n\n{}", para, para, para);
        let chunks = chunker.chunk(&text);
        assert_eq!(chunks, vec![para.clone(), para.clone(), para]);
    }

    #[test]
    fn test_split_at_sentences() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 80).unwrap();
        let text = "The first sentence is right here. The second one follows it! \
                    Does a third one exist? Yes, and it ends the paragraph.";
        let chunks = chunker.chunk(text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 80, "chunk too long: {:?}", chunk);
            assert!(chunk.ends_with(['.', '!', '?']), "not a sentence end: {:?}", chunk);
        }
    }

    #[test]
    fn test_split_at_clauses_without_sentence_ends() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 100).unwrap();
        let text = (0..20)
            .map(|i| format!("clause number {}", i))
            .collect::<Vec<_>>()
            .join(", ");
        assert!(text.len() > 100);

        let chunks = chunker.chunk(&text);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 100, "chunk too long: {:?}", chunk);
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.ends_with(','), "not a clause end: {:?}", chunk);
        }
        assert_eq!(squash(&chunks.concat()), squash(&text));
    }

    #[test]
    fn test_split_at_words() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 64).unwrap();
        let text = "lorem ipsum ".repeat(20);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 64);
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
    }

    #[test]
    fn test_hard_split_long_word() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 64).unwrap();
        let word = "x".repeat(200);
        let chunks = chunker.chunk(&word);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() <= 64));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn test_hard_split_respects_char_boundaries() {
        let parts = hard_split("ééééé", 3);
        assert_eq!(parts, vec!["é", "é", "é", "é", "é"]);

        let parts = hard_split("abcdefghij", 3);
        assert_eq!(parts, vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_multibyte_text_counts_bytes() {
        let chunker = TextChunker::new(SSML_OVERHEAD + 64).unwrap();
        let text = "日本語の文章です。".repeat(10);
        let chunks = chunker.chunk(&text);
        assert!(chunks.iter().all(|c| c.len() <= 64));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_keeping_markers() {
        let pieces = split_keeping_markers("a[SECTION_BREAK_1]b[SECTION_BREAK_3]");
        assert_eq!(pieces, vec!["a", "[SECTION_BREAK_1]", "b", "[SECTION_BREAK_3]", ""]);
    }

    #[test]
    fn test_split_after_punctuation() {
        let pieces = split_after_punctuation("One. Two!  Three?", &SENTENCE_END);
        assert_eq!(pieces, vec!["One.", "Two!", "Three?"]);

        let pieces = split_after_punctuation("3.14 is pi", &SENTENCE_END);
        assert_eq!(pieces, vec!["3.14 is pi"]);
    }

    fn narration_text() -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            4 => "[a-zA-Z]{1,12}",
            1 => "[éüñ漢字]{1,6}",
            1 => "[a-z]{80,300}",
            3 => Just(" ".to_string()),
            1 => Just(". ".to_string()),
            1 => Just(", ".to_string()),
            1 => Just("\n".to_string()),
            1 => Just("\n\n".to_string()),
            1 => (1u8..=3).prop_map(|level| format!("\n\n[SECTION_BREAK_{}]", level)),
        ];
        prop::collection::vec(piece, 0..300).prop_map(|pieces| pieces.concat())
    }

    proptest! {
        #[test]
        fn prop_chunks_fit_budget(text in narration_text(), budget in 64usize..1000) {
            let chunker = TextChunker::new(SSML_OVERHEAD + budget).unwrap();
            for chunk in chunker.chunk(&text) {
                prop_assert!(chunk.len() <= budget, "{} > {}", chunk.len(), budget);
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
        }

        #[test]
        fn prop_chunks_cover_text(text in narration_text(), budget in 64usize..1000) {
            let chunker = TextChunker::new(SSML_OVERHEAD + budget).unwrap();
            let chunks = chunker.chunk(&text);
            prop_assert_eq!(squash(&chunks.concat()), squash(&text));
        }
    }
}
