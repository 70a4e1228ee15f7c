//! Text processing for narration: markdown normalization, chunking, and SSML.

pub mod chunker;
pub mod markdown;
pub mod ssml;

pub use chunker::TextChunker;
pub use markdown::normalize_markdown;
pub use ssml::{build_ssml, prepare_plain_text};

use once_cell::sync::Lazy;
use regex::Regex;

/// Deepest heading level that gets its own pause length.
pub const MAX_SECTION_LEVEL: u8 = 3;

/// Matches any structural marker, e.g. `[SECTION_BREAK_2]`.
static SECTION_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[SECTION_BREAK_\d\]").expect("section break pattern is valid"));

static EXTRA_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// The structural marker for a heading or rule at `level`.
///
/// Levels past [`MAX_SECTION_LEVEL`] share the level 3 marker.
pub fn section_break(level: u8) -> String {
    format!("[SECTION_BREAK_{}]", level.clamp(1, MAX_SECTION_LEVEL))
}

/// Collapse runs of three or more newlines into a single blank line.
fn collapse_blank_lines(text: &str) -> String {
    EXTRA_BLANK_LINES.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_break_levels() {
        assert_eq!(section_break(1), "[SECTION_BREAK_1]");
        assert_eq!(section_break(3), "[SECTION_BREAK_3]");
        assert_eq!(section_break(6), "[SECTION_BREAK_3]");
        assert_eq!(section_break(0), "[SECTION_BREAK_1]");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\nc"), "a\n\nb\nc");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }
}
