//! Shell controller: turns keys into [`Action`]s and applies them to the
//! document session.
//!
//! The [`Shell`] owns the edit surface (through its `SyncEngine`), the
//! preview pane, the active tab, the one-line prompt and the notice queue.
//! It never performs IO itself: dispatching returns an [`IoRequest`] that the
//! runtime executes off the UI thread, and the resulting completion comes
//! back through [`Shell::complete_io`].
//!
//! [`IoRequest`]: core_io::IoRequest

mod dispatcher;
mod key_translator;
mod notice;
mod prompt;
mod shell;

pub use dispatcher::DispatchOutcome;
pub use key_translator::{KeyContext, translate_key};
pub use notice::{Notice, NoticeLevel, NoticeQueue};
pub use prompt::{Prompt, PromptKind};
pub use shell::{Shell, ShellSettings};

/// Spaces inserted for the Tab key.
pub const TAB_INSERT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Edit,
    Preview,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Edit => "Edit",
            Tab::Preview => "Preview",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Tab::Edit => Tab::Preview,
            Tab::Preview => Tab::Edit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    InsertTab,
    Newline,
    Backspace,
    DeleteForward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectTab(Tab),
    ToggleTab,
    /// Open the save prompt (only honored while the save affordance shows).
    Save,
    /// Open the import prompt.
    Import,
    Edit(EditKind),
    Motion(MotionKind),
    Scroll(ScrollKind),
    /// Bracketed paste payload, raw.
    Paste(String),
    PromptChar(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
}
