//! Frame composition.
//!
//! Every frame repaints the three regions of [`ScreenLayout`] into a
//! [`Writer`]; nothing here touches the terminal directly.

use core_actions::{NoticeLevel, Shell, Tab};
use core_render::layout::{LayoutRegion, ScreenLayout};
use core_render::writer::Writer;
use core_render::{SpanStyle, StyledLine};
use core_text::grapheme::{fit_width, visual_col};

pub(crate) const SAVE_HINT: &str = "[^S save]";
pub(crate) const KEY_HELP: &str = "^Q quit  F1 edit  F2 preview  ^T toggle  ^O import";

pub(crate) fn compose(shell: &Shell, width: u16, height: u16) -> Writer {
    let layout = ScreenLayout::compute(width, height);
    let cols = width as usize;
    let mut w = Writer::new();
    w.show_cursor(false);

    if !layout.tab_bar.is_empty() {
        w.clear_line(layout.tab_bar.y);
        w.line(&clip(&tab_bar(shell), cols));
    }
    paint_body(&mut w, shell, layout.body);
    if !layout.status.is_empty() {
        w.clear_line(layout.status.y);
        w.line(&clip(&status_line(shell), cols));
    }
    place_cursor(&mut w, shell, &layout);
    w
}

pub(crate) fn tab_bar(shell: &Shell) -> StyledLine {
    let mut line = StyledLine::default();
    for (key, tab) in [("F1", Tab::Edit), ("F2", Tab::Preview)] {
        let label = format!(" {key} {} ", tab.label());
        let style = if shell.tab() == tab {
            SpanStyle::REVERSE | SpanStyle::BOLD
        } else {
            SpanStyle::DIM
        };
        line.push(&label, style);
        line.push(" ", SpanStyle::empty());
    }
    if shell.save_visible() {
        line.push(SAVE_HINT, SpanStyle::BOLD);
    }
    line
}

pub(crate) fn status_line(shell: &Shell) -> StyledLine {
    let mut line = StyledLine::default();
    if let Some(prompt) = shell.prompt() {
        line.push(prompt.label(), SpanStyle::BOLD);
        line.push(prompt.input(), SpanStyle::empty());
    } else if let Some(notice) = shell.notices().current() {
        let style = match notice.level {
            NoticeLevel::Info => SpanStyle::empty(),
            NoticeLevel::Error => SpanStyle::REVERSE,
        };
        line.push(&notice.message, style);
    } else {
        line.push(KEY_HELP, SpanStyle::DIM);
    }
    line
}

fn paint_body(w: &mut Writer, shell: &Shell, body: LayoutRegion) {
    let cols = body.width as usize;
    match shell.tab() {
        Tab::Edit => {
            let editor = shell.editor();
            let first = editor.first_line();
            let mut lines = editor.lines().skip(first);
            for row in 0..body.height {
                w.clear_line(body.y + row);
                if let Some(text) = lines.next() {
                    w.print(fit_width(text, cols).0);
                }
            }
        }
        Tab::Preview => {
            let preview = shell.preview();
            let rendered = preview.rendered();
            let mut lines = rendered.lines.iter().skip(preview.first_line());
            for row in 0..body.height {
                w.clear_line(body.y + row);
                if let Some(line) = lines.next() {
                    w.line(&clip(line, cols));
                }
            }
        }
    }
}

fn place_cursor(w: &mut Writer, shell: &Shell, layout: &ScreenLayout) {
    let max_x = layout.body.width.saturating_sub(1);
    if let Some(prompt) = shell.prompt() {
        if layout.status.is_empty() {
            return;
        }
        let text = format!("{}{}", prompt.label(), prompt.input());
        let col = visual_col(&text, text.len()).min(max_x as usize) as u16;
        w.move_to(col, layout.status.y);
        w.show_cursor(true);
        return;
    }
    if shell.tab() != Tab::Edit {
        return;
    }
    let editor = shell.editor();
    let pos = editor.cursor_position();
    let first = editor.first_line();
    let rows = layout.body_rows();
    // Lines are clipped, not scrolled sideways; a cursor past the right edge stays hidden.
    if pos.line < first || pos.line >= first + rows || pos.col >= layout.body.width as usize {
        return;
    }
    w.move_to(pos.col as u16, layout.body.y + (pos.line - first) as u16);
    w.show_cursor(true);
}

/// Truncate `line` to `cols` terminal cells without splitting a grapheme.
pub(crate) fn clip(line: &StyledLine, cols: usize) -> StyledLine {
    let mut out = StyledLine::default();
    let mut left = cols;
    for span in &line.spans {
        let (head, used) = fit_width(&span.text, left);
        out.push(head, span.style);
        left -= used;
        if head.len() < span.text.len() {
            break;
        }
    }
    out
}
