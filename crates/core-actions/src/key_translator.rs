//! Stateless key → [`Action`] translation.
//!
//! Priority: global quit chords, then the prompt (which captures text keys),
//! then tab/file chords, then keys of the active tab.

use crate::{Action, EditKind, MotionKind, ScrollKind, Tab};
use core_events::{KeyCode, KeyEvent, KeyModifiers};

/// What the translator needs to know about the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub tab: Tab,
    pub prompt_active: bool,
}

pub fn translate_key(key: &KeyEvent, ctx: KeyContext) -> Option<Action> {
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    let alt = key.mods.contains(KeyModifiers::ALT);

    if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
        return Some(Action::Quit);
    }

    if ctx.prompt_active {
        return match key.code {
            KeyCode::Char(c) if !ctrl && !alt => Some(Action::PromptChar(c)),
            KeyCode::Backspace => Some(Action::PromptBackspace),
            KeyCode::Enter => Some(Action::PromptSubmit),
            KeyCode::Esc => Some(Action::PromptCancel),
            _ => None,
        };
    }

    match key.code {
        KeyCode::F(1) => return Some(Action::SelectTab(Tab::Edit)),
        KeyCode::F(2) => return Some(Action::SelectTab(Tab::Preview)),
        KeyCode::Char('t') if ctrl => return Some(Action::ToggleTab),
        KeyCode::Char('s') if ctrl => return Some(Action::Save),
        KeyCode::Char('o') if ctrl => return Some(Action::Import),
        _ => {}
    }

    match ctx.tab {
        Tab::Edit => translate_edit(key.code, ctrl || alt),
        Tab::Preview => translate_preview(key.code),
    }
}

fn translate_edit(code: KeyCode, chorded: bool) -> Option<Action> {
    let action = match code {
        KeyCode::Char(c) if !chorded => Action::Edit(EditKind::InsertChar(c)),
        KeyCode::Enter => Action::Edit(EditKind::Newline),
        KeyCode::Backspace => Action::Edit(EditKind::Backspace),
        KeyCode::Delete => Action::Edit(EditKind::DeleteForward),
        KeyCode::Tab => Action::Edit(EditKind::InsertTab),
        KeyCode::Left => Action::Motion(MotionKind::Left),
        KeyCode::Right => Action::Motion(MotionKind::Right),
        KeyCode::Up => Action::Motion(MotionKind::Up),
        KeyCode::Down => Action::Motion(MotionKind::Down),
        KeyCode::Home => Action::Motion(MotionKind::LineStart),
        KeyCode::End => Action::Motion(MotionKind::LineEnd),
        KeyCode::PageUp => Action::Motion(MotionKind::PageUp),
        KeyCode::PageDown => Action::Motion(MotionKind::PageDown),
        _ => return None,
    };
    Some(action)
}

fn translate_preview(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Up => Action::Scroll(ScrollKind::LineUp),
        KeyCode::Down => Action::Scroll(ScrollKind::LineDown),
        KeyCode::PageUp => Action::Scroll(ScrollKind::PageUp),
        KeyCode::PageDown => Action::Scroll(ScrollKind::PageDown),
        KeyCode::Home => Action::Scroll(ScrollKind::Top),
        _ => return None,
    };
    Some(action)
}
