//! Terminal edit surface: a single `String` with a grapheme-safe cursor and a
//! vertical scroll offset.
//!
//! `TextArea` implements [`EditSurface`] so it can be bound to the shared
//! content store by a `SyncEngine`. Like a platform text widget it raises a
//! [`TextChanged`] for every text mutation, programmatic replacement included.
//!
//! Cursor invariant: `cursor` is a byte offset on a grapheme cluster boundary
//! in `0..=text.len()`.

use core_model::{EditSurface, TextChanged};

pub mod grapheme;
pub mod segment;
pub mod width;

pub use width::egc_width;

/// Line index plus visual column (terminal cells) of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TextArea {
    text: String,
    cursor: usize,
    first_line: usize,
    /// Column remembered across vertical moves through shorter lines.
    preferred_col: Option<usize>,
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Lines without their terminating `\n`. An empty text has one empty line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines().nth(idx)
    }

    pub fn cursor_position(&self) -> Position {
        let start = self.line_start(self.cursor);
        Position {
            line: self.text[..self.cursor].matches('\n').count(),
            col: grapheme::visual_col(&self.text[start..], self.cursor - start),
        }
    }

    fn line_start(&self, byte: usize) -> usize {
        self.text[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, byte: usize) -> usize {
        self.text[byte..]
            .find('\n')
            .map(|i| byte + i)
            .unwrap_or(self.text.len())
    }

    fn changed(&self) -> Option<TextChanged> {
        Some(TextChanged(self.text.clone()))
    }

    // ---------------------------------------------------------------------
    // Edits. Each returns the change event the surface raised.
    // ---------------------------------------------------------------------

    pub fn insert_char(&mut self, ch: char) -> Option<TextChanged> {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf))
    }

    pub fn insert_str(&mut self, s: &str) -> Option<TextChanged> {
        if s.is_empty() {
            return None;
        }
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        // A combining mark may have merged with the previous cluster.
        self.cursor = grapheme::snap_to_boundary(&self.text, self.cursor);
        self.preferred_col = None;
        self.changed()
    }

    pub fn insert_newline(&mut self) -> Option<TextChanged> {
        self.insert_str("\n")
    }

    /// Delete the grapheme cluster before the cursor.
    pub fn backspace(&mut self) -> Option<TextChanged> {
        if self.cursor == 0 {
            return None;
        }
        let prev = grapheme::prev_boundary(&self.text, self.cursor);
        self.text.replace_range(prev..self.cursor, "");
        self.cursor = prev;
        self.preferred_col = None;
        self.changed()
    }

    /// Delete the grapheme cluster under the cursor.
    pub fn delete_forward(&mut self) -> Option<TextChanged> {
        if self.cursor >= self.text.len() {
            return None;
        }
        let next = grapheme::next_boundary(&self.text, self.cursor);
        self.text.replace_range(self.cursor..next, "");
        self.preferred_col = None;
        self.changed()
    }

    // ---------------------------------------------------------------------
    // Motions. Text is untouched, so no change event.
    // ---------------------------------------------------------------------

    pub fn move_left(&mut self) {
        self.cursor = grapheme::prev_boundary(&self.text, self.cursor);
        self.preferred_col = None;
    }

    pub fn move_right(&mut self) {
        self.cursor = grapheme::next_boundary(&self.text, self.cursor);
        self.preferred_col = None;
    }

    pub fn move_line_start(&mut self) {
        self.cursor = self.line_start(self.cursor);
        self.preferred_col = None;
    }

    pub fn move_line_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
        self.preferred_col = None;
    }

    pub fn move_up(&mut self) {
        self.move_vertical(-1);
    }

    pub fn move_down(&mut self) {
        self.move_vertical(1);
    }

    pub fn page_up(&mut self, rows: usize) {
        self.move_vertical(-(rows.max(1) as isize));
    }

    pub fn page_down(&mut self, rows: usize) {
        self.move_vertical(rows.max(1) as isize);
    }

    fn move_vertical(&mut self, delta: isize) {
        let pos = self.cursor_position();
        let col = *self.preferred_col.get_or_insert(pos.col);
        let last = self.line_count() - 1;
        let target = pos.line.saturating_add_signed(delta).min(last);
        if target == pos.line {
            return;
        }
        let start = self.line_offset(target);
        let end = self.line_end(start);
        self.cursor = start + grapheme::byte_at_col(&self.text[start..end], col);
    }

    /// Byte offset where line `idx` begins (clamped to the last line).
    fn line_offset(&self, idx: usize) -> usize {
        if idx == 0 {
            return 0;
        }
        self.text
            .match_indices('\n')
            .nth(idx - 1)
            .map(|(i, _)| i + 1)
            .unwrap_or_else(|| self.line_start(self.text.len()))
    }

    /// Adjust `first_line` so the cursor line lies within `rows` visible rows.
    pub fn scroll_into_view(&mut self, rows: usize) {
        let rows = rows.max(1);
        let line = self.cursor_position().line;
        if line < self.first_line {
            self.first_line = line;
        } else if line >= self.first_line + rows {
            self.first_line = line + 1 - rows;
        }
    }
}

impl EditSurface for TextArea {
    fn text(&self) -> &str {
        &self.text
    }

    fn replace_text(&mut self, text: &str) -> Option<TextChanged> {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = self.cursor.min(self.text.len());
        self.cursor = grapheme::snap_to_boundary(&self.text, self.cursor);
        self.preferred_col = None;
        self.changed()
    }

    fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
        self.preferred_col = None;
    }

    fn scroll_to_top(&mut self) {
        self.first_line = 0;
    }
}
