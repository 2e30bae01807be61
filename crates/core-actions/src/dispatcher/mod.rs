//! Applying [`Action`]s to the shell.
//!
//! * `edit`    - keystrokes and paste on the edit surface, cursor motions
//! * `command` - save / import prompts and the requests they produce
//! * `io`      - completions coming back from the IO worker
//!
//! Tab switching and preview scrolling are small enough to live here.

use crate::{Action, ScrollKind, Shell, Tab};
use core_io::IoRequest;
use tracing::trace;

mod command;
mod edit;
mod io;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct DispatchOutcome {
    pub quit: bool,
    /// Work for the IO worker; the completion must be fed back through
    /// [`Shell::complete_io`].
    pub io: Option<IoRequest>,
}

impl DispatchOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn quit() -> Self {
        Self {
            quit: true,
            io: None,
        }
    }

    pub fn io(request: IoRequest) -> Self {
        Self {
            quit: false,
            io: Some(request),
        }
    }
}

impl Shell {
    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        // Paste payloads are logged by size only, in `edit`.
        if !matches!(action, Action::Paste(_)) {
            trace!(target: "actions.dispatch", ?action, "dispatch");
        }
        match action {
            Action::Quit => DispatchOutcome::quit(),
            Action::SelectTab(tab) => {
                self.select_tab(tab);
                DispatchOutcome::none()
            }
            Action::ToggleTab => {
                self.select_tab(self.tab.other());
                DispatchOutcome::none()
            }
            Action::Save => {
                self.begin_save();
                DispatchOutcome::none()
            }
            Action::Import => {
                self.begin_import();
                DispatchOutcome::none()
            }
            Action::Edit(kind) => {
                self.apply_edit(kind);
                DispatchOutcome::none()
            }
            Action::Motion(kind) => {
                self.apply_motion(kind);
                DispatchOutcome::none()
            }
            Action::Scroll(kind) => {
                self.scroll_preview(kind);
                DispatchOutcome::none()
            }
            Action::Paste(text) => {
                self.paste(&text);
                DispatchOutcome::none()
            }
            Action::PromptChar(_)
            | Action::PromptBackspace
            | Action::PromptSubmit
            | Action::PromptCancel => self.handle_prompt_action(action),
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            trace!(target: "actions.dispatch", from = self.tab.label(), to = tab.label(), "tab");
            self.tab = tab;
        }
    }

    fn scroll_preview(&mut self, kind: ScrollKind) {
        let page = self.body_rows as isize;
        match kind {
            ScrollKind::LineUp => self.preview.scroll_by(-1),
            ScrollKind::LineDown => self.preview.scroll_by(1),
            ScrollKind::PageUp => self.preview.scroll_by(-page),
            ScrollKind::PageDown => self.preview.scroll_by(page),
            ScrollKind::Top => self.preview.scroll_to_top(),
        }
    }
}
