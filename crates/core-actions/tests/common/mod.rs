#![allow(dead_code)]

use core_actions::{Action, EditKind, Shell, ShellSettings};
use core_io::{IoCompletion, LoadOrigin, LocationHandle};
use core_render::MarkdownRenderer;
use core_state::ContentStore;
use std::rc::Rc;

pub fn shell() -> Shell {
    Shell::new(
        ContentStore::new(),
        Rc::new(MarkdownRenderer::new()),
        ShellSettings::default(),
    )
}

pub fn type_text(shell: &mut Shell, text: &str) {
    for ch in text.chars() {
        let action = if ch == '\n' {
            Action::Edit(EditKind::Newline)
        } else {
            Action::Edit(EditKind::InsertChar(ch))
        };
        let outcome = shell.dispatch(action);
        assert!(outcome.io.is_none() && !outcome.quit);
    }
}

pub fn type_prompt(shell: &mut Shell, text: &str) {
    for ch in text.chars() {
        let _ = shell.dispatch(Action::PromptChar(ch));
    }
}

pub fn clear_prompt(shell: &mut Shell) {
    while shell.prompt().is_some_and(|p| !p.input().is_empty()) {
        let _ = shell.dispatch(Action::PromptBackspace);
    }
}

/// Install `content` as if it had been imported from `name`.
pub fn load(shell: &mut Shell, name: &str, content: &str) {
    shell.complete_io(IoCompletion::Loaded {
        handle: LocationHandle::new(name),
        display_name: name.to_string(),
        origin: LoadOrigin::Import,
        result: Ok(content.to_string()),
    });
}

pub fn notice_messages(shell: &Shell) -> Vec<String> {
    shell.notices().iter().map(|n| n.message.clone()).collect()
}
