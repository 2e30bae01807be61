//! Markdown → styled lines, driven by the `pulldown-cmark` event stream.
//!
//! Layout rules:
//! * Blocks (paragraphs, headings, lists, quotes, code, tables, rules) are
//!   separated by one blank line; the output never ends in a blank line.
//! * List items start with `• ` (unordered) or `N. ` (ordered), indented two
//!   cells per nesting level; continuation lines align under the item text.
//! * Quote lines are prefixed with `│ ` per nesting level.
//! * Links keep their text and append the destination in dim style unless the
//!   text already is the destination.

use crate::style::{SpanStyle, StyledLine, StyledText};
use crate::Renderer;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tracing::trace;

const RULE_WIDTH: usize = 40;
const CODE_INDENT: &str = "  ";
const QUOTE_BAR: &str = "│ ";

#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, content: &str) -> StyledText {
        let mut builder = LineBuilder::default();
        for event in Parser::new_ext(content, self.options) {
            builder.event(event);
        }
        let text = builder.finish();
        trace!(target: "render.markdown", input_len = content.len(), lines = text.line_count(), "rendered");
        text
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<StyledLine>,
    current: StyledLine,
    line_open: bool,
    need_blank: bool,
    styles: Vec<SpanStyle>,
    quote_depth: usize,
    /// One entry per open list: next ordinal for ordered lists.
    lists: Vec<Option<u64>>,
    pending_bullet: Option<String>,
    in_code_block: bool,
    link_urls: Vec<String>,
    link_text: String,
    table_cell: usize,
}

impl LineBuilder {
    fn style(&self) -> SpanStyle {
        self.styles
            .iter()
            .fold(SpanStyle::empty(), |acc, s| acc | *s)
    }

    fn open_line(&mut self) {
        if self.line_open {
            return;
        }
        if self.need_blank && !self.lines.is_empty() {
            self.lines.push(StyledLine::default());
        }
        self.need_blank = false;
        self.line_open = true;
        for _ in 0..self.quote_depth {
            self.current.push(QUOTE_BAR, SpanStyle::QUOTE);
        }
        if let Some(bullet) = self.pending_bullet.take() {
            self.current.push(&bullet, SpanStyle::empty());
        } else if !self.lists.is_empty() {
            self.current
                .push(&"  ".repeat(self.lists.len()), SpanStyle::empty());
        }
        if self.in_code_block {
            self.current.push(CODE_INDENT, SpanStyle::empty());
        }
    }

    fn push(&mut self, text: &str, extra: SpanStyle) {
        if text.is_empty() {
            return;
        }
        self.open_line();
        let style = self.style() | extra;
        self.current.push(text, style);
        if !self.link_urls.is_empty() {
            self.link_text.push_str(text);
        }
    }

    /// Push text that may contain newlines; each newline ends a line, empty
    /// lines included.
    fn push_multiline(&mut self, text: &str, extra: SpanStyle) {
        let mut pieces = text.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            self.push(piece.strip_suffix('\r').unwrap_or(piece), extra);
            if pieces.peek().is_some() {
                self.open_line();
                self.close_line();
            }
        }
    }

    fn close_line(&mut self) {
        if self.line_open {
            let line = std::mem::take(&mut self.current);
            self.lines.push(line);
            self.line_open = false;
        }
    }

    fn end_block(&mut self) {
        self.close_line();
        self.need_blank = true;
    }

    fn start_block(&mut self) {
        self.close_line();
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_multiline(&text, SpanStyle::empty()),
            Event::Code(code) => self.push(&code, SpanStyle::CODE),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_multiline(&html, SpanStyle::empty());
            }
            Event::SoftBreak => self.push(" ", SpanStyle::empty()),
            Event::HardBreak => {
                self.open_line();
                self.close_line();
            }
            Event::Rule => {
                self.start_block();
                self.push(&"─".repeat(RULE_WIDTH), SpanStyle::DIM);
                self.end_block();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push(marker, SpanStyle::empty());
            }
            Event::FootnoteReference(label) => {
                self.push(&format!("[^{label}]"), SpanStyle::DIM);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.start_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let mut style = SpanStyle::HEADING | SpanStyle::BOLD;
                if level == HeadingLevel::H1 {
                    style |= SpanStyle::UNDERLINE;
                }
                self.styles.push(style);
            }
            Tag::BlockQuote(..) => {
                self.start_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(..) => {
                self.start_block();
                self.in_code_block = true;
                self.styles.push(SpanStyle::CODE);
            }
            Tag::HtmlBlock => self.start_block(),
            Tag::List(start) => {
                self.close_line();
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.close_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.pending_bullet = Some(format!("{}{marker}", "  ".repeat(depth)));
            }
            Tag::Emphasis => self.styles.push(SpanStyle::ITALIC),
            Tag::Strong => self.styles.push(SpanStyle::BOLD),
            Tag::Strikethrough => self.styles.push(SpanStyle::STRIKE),
            Tag::Link { dest_url, .. } => {
                self.styles.push(SpanStyle::LINK | SpanStyle::UNDERLINE);
                self.link_urls.push(dest_url.into_string());
                self.link_text.clear();
            }
            Tag::Image { .. } => {
                self.push("[image: ", SpanStyle::DIM);
                self.styles.push(SpanStyle::DIM);
            }
            Tag::Table(..) => self.start_block(),
            Tag::TableHead => {
                self.table_cell = 0;
                self.styles.push(SpanStyle::BOLD);
            }
            Tag::TableRow => self.table_cell = 0,
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push(" | ", SpanStyle::DIM);
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.end_block();
                } else {
                    self.close_line();
                }
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.end_block();
            }
            TagEnd::BlockQuote(..) => {
                self.close_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.need_blank = true;
            }
            TagEnd::CodeBlock => {
                self.styles.pop();
                self.close_line();
                self.in_code_block = false;
                self.need_blank = true;
            }
            TagEnd::HtmlBlock => self.end_block(),
            TagEnd::List(_) => {
                self.close_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.need_blank = true;
                }
            }
            TagEnd::Item => {
                if let Some(bullet) = self.pending_bullet.take() {
                    self.open_line();
                    self.current.push(&bullet, SpanStyle::empty());
                }
                self.close_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                let url = self.link_urls.pop().unwrap_or_default();
                if !url.is_empty() && self.link_text != url {
                    self.push(&format!(" ({url})"), SpanStyle::DIM);
                }
                self.link_text.clear();
            }
            TagEnd::Image => {
                self.styles.pop();
                self.push("]", SpanStyle::DIM);
            }
            TagEnd::TableHead => {
                self.styles.pop();
                self.close_line();
            }
            TagEnd::TableRow => self.close_line(),
            TagEnd::Table => self.end_block(),
            _ => {}
        }
    }

    fn finish(mut self) -> StyledText {
        self.close_line();
        while self.lines.last().is_some_and(StyledLine::is_empty) {
            self.lines.pop();
        }
        StyledText { lines: self.lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(md: &str) -> Vec<String> {
        MarkdownRenderer::new().render(md).plain_lines()
    }

    fn span_style(md: &str, needle: &str) -> SpanStyle {
        let text = MarkdownRenderer::new().render(md);
        text.lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|s| s.text.contains(needle))
            .map(|s| s.style)
            .unwrap_or_else(|| panic!("no span containing {needle:?}"))
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(MarkdownRenderer::new().render("").is_empty());
    }

    #[test]
    fn blocks_are_separated_by_one_blank_line() {
        assert_eq!(
            plain("# Title\n\nFirst para.\n\nSecond\npara."),
            vec!["Title", "", "First para.", "", "Second para."]
        );
    }

    #[test]
    fn heading_and_inline_styles() {
        let h1 = span_style("# Title", "Title");
        assert!(h1.contains(SpanStyle::HEADING | SpanStyle::BOLD | SpanStyle::UNDERLINE));
        let h2 = span_style("## Sub", "Sub");
        assert!(!h2.contains(SpanStyle::UNDERLINE));
        assert!(span_style("a **b** c", "b").contains(SpanStyle::BOLD));
        assert!(span_style("a *i* c", "i").contains(SpanStyle::ITALIC));
        assert!(span_style("a ~~s~~ c", "s").contains(SpanStyle::STRIKE));
        assert!(span_style("a `x` c", "x").contains(SpanStyle::CODE));
    }

    #[test]
    fn unordered_and_nested_lists() {
        assert_eq!(
            plain("* one\n* two\n  * deep\n* three"),
            vec!["• one", "• two", "  • deep", "• three"]
        );
    }

    #[test]
    fn ordered_list_respects_start() {
        assert_eq!(plain("3. c\n4. d"), vec!["3. c", "4. d"]);
    }

    #[test]
    fn task_markers() {
        assert_eq!(plain("- [x] done\n- [ ] todo"), vec!["• [x] done", "• [ ] todo"]);
    }

    #[test]
    fn link_appends_destination() {
        assert_eq!(
            plain("[Link Example](https://example.com)"),
            vec!["Link Example (https://example.com)"]
        );
        assert!(span_style("[x](u)", "x").contains(SpanStyle::LINK));
        assert_eq!(plain("<https://a.b>"), vec!["https://a.b"]);
    }

    #[test]
    fn code_block_keeps_lines_and_blank_lines() {
        assert_eq!(
            plain("```\nfn a() {}\n\nfn b() {}\n```\nafter"),
            vec!["  fn a() {}", "  ", "  fn b() {}", "", "after"]
        );
    }

    #[test]
    fn block_quote_prefix() {
        assert_eq!(plain("> quoted\n> more"), vec!["│ quoted more"]);
    }

    #[test]
    fn table_rows_join_cells() {
        assert_eq!(
            plain("| a | b |\n|---|---|\n| 1 | 2 |"),
            vec!["a | b", "1 | 2"]
        );
        assert!(span_style("| head |\n|---|\n| x |", "head").contains(SpanStyle::BOLD));
    }

    #[test]
    fn rule_and_image() {
        let lines = plain("above\n\n---\n\n![alt](p.png)");
        assert_eq!(lines[0], "above");
        assert_eq!(lines[2], "─".repeat(RULE_WIDTH));
        assert_eq!(lines[4], "[image: alt]");
    }

    #[test]
    fn sample_document_layout() {
        let sample = "# Markdown Editor\n\nThis is a **bold** text.\n\n## List Example\n* Item 1\n* Item 2\n\n[Link Example](https://example.com)";
        assert_eq!(
            plain(sample),
            vec![
                "Markdown Editor",
                "",
                "This is a bold text.",
                "",
                "List Example",
                "",
                "• Item 1",
                "• Item 2",
                "",
                "Link Example (https://example.com)",
            ]
        );
    }
}
