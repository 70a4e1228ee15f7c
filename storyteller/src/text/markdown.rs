//! Markdown to narration text.
//!
//! Styling is dropped because speech cannot carry it. Headings and rules
//! become `[SECTION_BREAK_N]` markers so later stages can turn them into
//! pauses.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use super::{collapse_blank_lines, section_break};

/// Convert markdown into narrator-friendly plain text with structural markers.
///
/// Never fails: the parser accepts any input and unknown constructs fall
/// back to their literal text.
pub fn normalize_markdown(input: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;

    let mut renderer = NarrationRenderer::default();
    for event in Parser::new_ext(input, options) {
        renderer.handle(event);
    }

    collapse_blank_lines(&renderer.out).trim().to_string()
}

#[derive(Default)]
struct NarrationRenderer {
    out: String,
    /// Alt text being collected while inside an image
    image_alt: Option<String>,
    in_table_head: bool,
    list_depth: usize,
}

impl NarrationRenderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.push_text(&text),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Rule => {
                self.out.push('\n');
                self.out.push_str(&section_break(1));
                self.out.push_str("\n\n");
            }
            // Raw HTML, footnote references, task markers
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.out.push_str("\n\n");
                self.out.push_str(&section_break(level as u8));
            }
            Tag::CodeBlock(_) => self.out.push('\n'),
            Tag::List(_) => {
                self.list_depth += 1;
                // A nested list starts on its own line
                if !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            Tag::Image { .. } => self.image_alt = Some(String::new()),
            Tag::TableHead => self.in_table_head = true,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::CodeBlock => {
                self.out.push_str("\n\n")
            }
            TagEnd::Item => {
                // An item ending right after a nested list already has its newline
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.out.push('\n');
                }
            }
            TagEnd::TableRow | TagEnd::Table => self.out.push('\n'),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push('\n');
            }
            TagEnd::TableCell => {
                let suffix = if self.in_table_head { ": " } else { ". " };
                self.out.push_str(suffix);
            }
            TagEnd::Image => {
                if let Some(alt) = self.image_alt.take() {
                    let alt = alt.trim();
                    if !alt.is_empty() {
                        self.out.push_str(&format!("(Image: {})", alt));
                    }
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        match self.image_alt.as_mut() {
            Some(alt) => alt.push_str(text),
            None => self.out.push_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_gets_marker() {
        let text = normalize_markdown("# Title\n\nHello world.");
        assert_eq!(text, "[SECTION_BREAK_1]Title\n\nHello world.");
    }

    #[test]
    fn test_heading_levels() {
        let text = normalize_markdown("## Part\n\n### Section\n\n##### Deep");
        assert_eq!(
            text,
            "[SECTION_BREAK_2]Part\n\n[SECTION_BREAK_3]Section\n\n[SECTION_BREAK_3]Deep"
        );
    }

    #[test]
    fn test_horizontal_rule() {
        let text = normalize_markdown("Above\n\n---\n\nBelow");
        assert_eq!(text, "Above\n\n[SECTION_BREAK_1]\n\nBelow");
    }

    #[test]
    fn test_paragraphs() {
        let text = normalize_markdown("First paragraph.\n\n\n\nSecond paragraph.");
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_lists_are_flattened() {
        let text = normalize_markdown("Shopping:\n\n- eggs\n- milk\n\n1. first\n2. second");
        assert_eq!(text, "Shopping:\n\neggs\nmilk\n\nfirst\nsecond");
    }

    #[test]
    fn test_nested_list() {
        let text = normalize_markdown("- outer\n  - inner\n- last");
        assert_eq!(text, "outer\ninner\nlast");
    }

    #[test]
    fn test_list_ends_paragraph() {
        let text = normalize_markdown("- outer\n  - inner\n- last\n\nAfter list");
        assert_eq!(text, "outer\ninner\nlast\n\nAfter list");
    }

    #[test]
    fn test_styling_removed() {
        let text = normalize_markdown("Some **bold**, *italic* and ~~struck~~ [linked](http://x.y) words.");
        assert_eq!(text, "Some bold, italic and struck linked words.");
    }

    #[test]
    fn test_code_kept_without_fences() {
        let text = normalize_markdown("Run `cargo test` now.\n\n```rust\nfn main() {}\n```\n\nDone.");
        assert_eq!(text, "Run cargo test now.\n\nfn main() {}\n\nDone.");
    }

    #[test]
    fn test_images() {
        assert_eq!(
            normalize_markdown("Look: ![A sleeping cat](cat.png)"),
            "Look: (Image: A sleeping cat)"
        );
        assert_eq!(normalize_markdown("Look: ![](cat.png)"), "Look:");
    }

    #[test]
    fn test_html_dropped() {
        let text = normalize_markdown("<div class=\"note\">\nhidden\n</div>\n\nVisible <span>text</span>.");
        assert_eq!(text, "Visible text.");
    }

    #[test]
    fn test_line_breaks() {
        let text = normalize_markdown("line one  \nline two\nline three");
        assert_eq!(text, "line one\nline two\nline three");
    }

    #[test]
    fn test_table_flattened() {
        let text = normalize_markdown("| Name | Age |\n|------|-----|\n| Alice | 30 |\n| Bob | 25 |\n");
        assert_eq!(text, "Name: Age: \nAlice. 30. \nBob. 25.");
    }

    #[test]
    fn test_block_quote() {
        let text = normalize_markdown("> Quoted words.\n\nAfter.");
        assert_eq!(text, "Quoted words.\n\nAfter.");
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = normalize_markdown("Just a plain sentence. And another one!");
        assert_eq!(text, "Just a plain sentence. And another one!");
    }

    #[test]
    fn test_malformed_input_degrades() {
        let text = normalize_markdown("**unclosed bold and [broken link( and `tick");
        assert!(text.contains("unclosed bold"));
        assert!(text.contains("broken link"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_markdown(""), "");
        assert_eq!(normalize_markdown("   \n\n  "), "");
        assert_eq!(normalize_markdown("<!-- only a comment -->"), "");
    }
}
