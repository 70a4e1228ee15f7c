//! Per-engine rendering of chunks: SSML documents or plain prompts.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::{SECTION_BREAK, collapse_blank_lines, section_break};

/// Pause after each heading level (level 1 first).
const SECTION_PAUSES_MS: [(u8, u32); 3] = [(1, 1500), (2, 1000), (3, 700)];

/// Pause for a blank line between paragraphs.
pub const PARAGRAPH_PAUSE_MS: u32 = 500;

/// Pause for a single line break.
pub const LINE_PAUSE_MS: u32 = 250;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\n+").expect("paragraph pattern is valid"));

/// Escape the five XML special characters, ampersand first.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn pause(ms: u32) -> String {
    format!("<break time=\"{}ms\"/>", ms)
}

/// Wrap one chunk in a `<speak>` document, turning markers and line
/// structure into timed pauses.
///
/// Markers contain no XML special characters, so they survive escaping
/// and are replaced afterwards.
pub fn build_ssml(chunk: &str) -> String {
    let mut body = escape_xml(chunk);

    for (level, ms) in SECTION_PAUSES_MS {
        body = body.replace(&section_break(level), &pause(ms));
    }

    let paragraph = pause(PARAGRAPH_PAUSE_MS);
    body = PARAGRAPH_BREAK
        .replace_all(&body, NoExpand(&paragraph))
        .into_owned();
    body = body.replace('\n', &pause(LINE_PAUSE_MS));

    format!("<speak>{}</speak>", body)
}

/// Plain prompt for engines without SSML: markers become blank lines.
pub fn prepare_plain_text(chunk: &str) -> String {
    let text = SECTION_BREAK.replace_all(chunk, "\n\n");
    collapse_blank_lines(&text).trim().to_string()
}
