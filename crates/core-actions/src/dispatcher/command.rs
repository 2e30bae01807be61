//! Save and import prompts.
//!
//! Save is only offered while the save affordance is visible (the document is
//! dirty). The prompt starts with the configured default name; an empty name
//! is rejected with a notice, anything else gets a Markdown extension and
//! becomes an `IoRequest::Save` carrying the current store content and the
//! revision it was taken at.

use super::DispatchOutcome;
use crate::{Action, NoticeLevel, Prompt, PromptKind, Shell};
use core_io::{IoRequest, LoadOrigin, LocationHandle, ensure_markdown_extension};
use tracing::{debug, info};

pub(crate) const EMPTY_NAME_NOTICE: &str = "Enter a file name";

impl Shell {
    pub(crate) fn begin_save(&mut self) {
        if !self.save_visible.get() {
            debug!(target: "actions.command", "save_ignored_clean");
            return;
        }
        self.prompt = Some(Prompt::new(
            PromptKind::SaveAs,
            self.settings.default_save_name.clone(),
        ));
    }

    pub(crate) fn begin_import(&mut self) {
        self.prompt = Some(Prompt::new(PromptKind::Import, ""));
    }

    pub(crate) fn handle_prompt_action(&mut self, action: Action) -> DispatchOutcome {
        let Some(prompt) = self.prompt.as_mut() else {
            return DispatchOutcome::none();
        };
        match action {
            Action::PromptChar(ch) => prompt.push_char(ch),
            Action::PromptBackspace => prompt.backspace(),
            Action::PromptCancel => {
                debug!(target: "actions.command", kind = ?prompt.kind(), "prompt_cancelled");
                self.prompt = None;
            }
            Action::PromptSubmit => {
                if let Some(prompt) = self.prompt.take() {
                    return self.submit_prompt(prompt);
                }
            }
            _ => {}
        }
        DispatchOutcome::none()
    }

    fn submit_prompt(&mut self, prompt: Prompt) -> DispatchOutcome {
        let (kind, name) = prompt.submit();
        if name.is_empty() {
            self.notify(EMPTY_NAME_NOTICE, NoticeLevel::Info);
            return DispatchOutcome::none();
        }
        match kind {
            PromptKind::SaveAs => {
                let target = ensure_markdown_extension(&name);
                let content = self.store.get();
                let revision = self.store.revision();
                info!(
                    target: "actions.command",
                    size_bytes = content.len(),
                    revision,
                    "save_requested"
                );
                DispatchOutcome::io(IoRequest::Save {
                    handle: LocationHandle::new(target),
                    content,
                    revision,
                })
            }
            PromptKind::Import => {
                info!(target: "actions.command", "import_requested");
                DispatchOutcome::io(IoRequest::Load {
                    handle: LocationHandle::new(name),
                    origin: LoadOrigin::Import,
                })
            }
        }
    }
}
