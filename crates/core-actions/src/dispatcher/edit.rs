//! Keystrokes, paste and motions on the edit surface.
//!
//! Text mutations go through `SyncEngine::edit` so the surface's change event
//! reaches the store; motions only touch view state.

use crate::{EditKind, MotionKind, Shell, TAB_INSERT, Tab};
use core_text::segment::normalize_pasted;
use tracing::trace;

impl Shell {
    pub(crate) fn apply_edit(&mut self, kind: EditKind) {
        if self.tab != Tab::Edit {
            return;
        }
        let change = self.engine.edit(|area| match kind {
            EditKind::InsertChar(ch) => area.insert_char(ch),
            EditKind::InsertTab => area.insert_str(TAB_INSERT),
            EditKind::Newline => area.insert_newline(),
            EditKind::Backspace => area.backspace(),
            EditKind::DeleteForward => area.delete_forward(),
        });
        trace!(target: "actions.dispatch", ?kind, changed = change.is_some(), "edit");
        self.keep_cursor_visible();
    }

    pub(crate) fn apply_motion(&mut self, kind: MotionKind) {
        if self.tab != Tab::Edit {
            return;
        }
        let rows = self.body_rows;
        self.engine.with_surface_mut(|area| match kind {
            MotionKind::Left => area.move_left(),
            MotionKind::Right => area.move_right(),
            MotionKind::Up => area.move_up(),
            MotionKind::Down => area.move_down(),
            MotionKind::LineStart => area.move_line_start(),
            MotionKind::LineEnd => area.move_line_end(),
            MotionKind::PageUp => area.page_up(rows),
            MotionKind::PageDown => area.page_down(rows),
        });
        self.keep_cursor_visible();
    }

    /// Bracketed paste: into the prompt when one is open, else into the
    /// editor on the Edit tab. Ignored on the Preview tab.
    pub(crate) fn paste(&mut self, raw: &str) {
        let (text, clusters) = normalize_pasted(raw);
        trace!(target: "actions.dispatch", size_bytes = text.len(), clusters, "paste");
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.push_str(&text);
            return;
        }
        if self.tab != Tab::Edit {
            return;
        }
        self.engine.edit(|area| area.insert_str(&text));
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&self) {
        let rows = self.body_rows;
        self.engine.with_surface_mut(|area| area.scroll_into_view(rows));
    }
}
