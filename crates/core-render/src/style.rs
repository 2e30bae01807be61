//! Styled text model shared by the renderer and the terminal writer.
//!
//! A `StyledText` is a list of display lines; each line is a list of spans.
//! Spans never contain `\n`. Styles combine as bitflags and map onto terminal
//! attributes in `writer`.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SpanStyle: u16 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKE = 1 << 3;
        const CODE = 1 << 4;
        const HEADING = 1 << 5;
        const LINK = 1 << 6;
        const QUOTE = 1 << 7;
        const DIM = 1 << 8;
        const REVERSE = 1 << 9;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Append, merging into the previous span when the style matches.
    pub fn push(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(StyledSpan::new(text, style)),
        }
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledText {
    pub lines: Vec<StyledLine>,
}

impl StyledText {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Unstyled view, one string per line.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(StyledLine::plain_text).collect()
    }
}
