//! Frame writer: batches primitive terminal operations and flushes them in
//! one pass.
//!
//! Invariants:
//! * Commands keep their order; nothing is emitted before `flush`.
//! * Positions are absolute with a (0,0) origin; callers keep them in bounds.
//! * Every styled print resets attributes afterwards, so styles never leak
//!   into the next command.

use crate::style::{SpanStyle, StyledLine};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    /// Clear the row the cursor is on; callers precede it with `MoveTo(0, y)`.
    ClearLine,
    ClearAll,
    Print(String),
    Styled(String, SpanStyle),
    ShowCursor(bool),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn clear_line(&mut self, y: u16) {
        self.cmds.push(Command::MoveTo(0, y));
        self.cmds.push(Command::ClearLine);
    }

    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn styled<S: Into<String>>(&mut self, s: S, style: SpanStyle) {
        let s: String = s.into();
        if s.is_empty() {
            return;
        }
        if style.is_empty() {
            self.cmds.push(Command::Print(s));
        } else {
            self.cmds.push(Command::Styled(s, style));
        }
    }

    /// Queue every span of `line`; truncation is the caller's job.
    pub fn line(&mut self, line: &StyledLine) {
        for span in &line.spans {
            self.styled(span.text.clone(), span.style);
        }
    }

    pub fn show_cursor(&mut self, visible: bool) {
        self.cmds.push(Command::ShowCursor(visible));
    }

    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        self.flush_to(&mut out)
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearLine => queue!(out, Clear(ClearType::CurrentLine))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::Styled(s, style) => {
                    apply_style(out, style)?;
                    queue!(out, Print(s), SetAttribute(Attribute::Reset), ResetColor)?;
                }
                Command::ShowCursor(true) => queue!(out, Show)?,
                Command::ShowCursor(false) => queue!(out, Hide)?,
            }
        }
        out.flush()?;
        Ok(())
    }
}

fn apply_style<W: Write>(out: &mut W, style: SpanStyle) -> Result<()> {
    let attributes = [
        (SpanStyle::BOLD, Attribute::Bold),
        (SpanStyle::ITALIC, Attribute::Italic),
        (SpanStyle::UNDERLINE, Attribute::Underlined),
        (SpanStyle::STRIKE, Attribute::CrossedOut),
        (SpanStyle::DIM, Attribute::Dim),
        (SpanStyle::REVERSE, Attribute::Reverse),
    ];
    for (flag, attribute) in attributes {
        if style.contains(flag) {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    if let Some(color) = foreground_for(style) {
        queue!(out, SetForegroundColor(color))?;
    }
    Ok(())
}

fn foreground_for(style: SpanStyle) -> Option<Color> {
    if style.contains(SpanStyle::HEADING) {
        Some(Color::Cyan)
    } else if style.contains(SpanStyle::LINK) {
        Some(Color::Blue)
    } else if style.contains(SpanStyle::CODE) {
        Some(Color::Yellow)
    } else if style.contains(SpanStyle::QUOTE) {
        Some(Color::DarkGrey)
    } else {
        None
    }
}
