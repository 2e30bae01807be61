//! One-line input prompt used for the save name and the import location.

use core_text::grapheme::prev_boundary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAs,
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            input: initial.into(),
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            PromptKind::SaveAs => "Save as: ",
            PromptKind::Import => "Import: ",
        }
    }

    pub fn push_char(&mut self, ch: char) {
        if ch != '\n' && ch != '\r' {
            self.input.push(ch);
        }
    }

    /// Append pasted text; only its first line is kept.
    pub fn push_str(&mut self, s: &str) {
        let first = s.split(['\n', '\r']).next().unwrap_or_default();
        self.input.push_str(first);
    }

    /// Remove the last grapheme cluster.
    pub fn backspace(&mut self) {
        let cut = prev_boundary(&self.input, self.input.len());
        self.input.truncate(cut);
    }

    /// Consume the prompt, returning the trimmed input.
    pub fn submit(self) -> (PromptKind, String) {
        (self.kind, self.input.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_and_submit_trims() {
        let mut p = Prompt::new(PromptKind::SaveAs, "untitled.md");
        for _ in 0.."untitled.md".len() {
            p.backspace();
        }
        assert_eq!(p.input(), "");
        for c in "  note ".chars() {
            p.push_char(c);
        }
        assert_eq!(p.submit(), (PromptKind::SaveAs, "note".to_string()));
    }

    #[test]
    fn backspace_removes_whole_cluster() {
        let mut p = Prompt::new(PromptKind::Import, "ne\u{301}");
        p.backspace();
        assert_eq!(p.input(), "n");
        p.backspace();
        p.backspace();
        assert_eq!(p.input(), "");
    }

    #[test]
    fn pasted_text_keeps_first_line() {
        let mut p = Prompt::new(PromptKind::Import, "");
        p.push_str("docs/a.md\r\nrest");
        assert_eq!(p.input(), "docs/a.md");
        assert_eq!(p.label(), "Import: ");
    }
}
