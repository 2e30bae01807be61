//! Terminal session control for the full-screen UI.
//!
//! `TerminalGuard` restores the terminal (leave alternate screen, cooked
//! mode, visible cursor) when dropped, including during unwinding.

use anyhow::Result;
use crossterm::{
    cursor::Hide,
    cursor::Show,
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::stdout;
use tracing::debug;

pub const APP_TITLE: &str = "Marknote";

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Current size as (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// Holds the terminal in raw alternate-screen mode; leaves it when dropped.
pub struct TerminalGuard<'a, B: TerminalBackend> {
    backend: &'a mut B,
    active: bool,
}

impl<'a, B: TerminalBackend> TerminalGuard<'a, B> {
    /// Enter `backend` and return a guard that will leave on drop.
    pub fn enter(backend: &'a mut B) -> Result<Self> {
        backend.enter()?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    pub fn backend(&mut self) -> &mut B {
        self.backend
    }

    /// Leave now instead of on drop, surfacing the error.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.backend.leave()
    }
}

impl<'a, B: TerminalBackend> Drop for TerminalGuard<'a, B> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_, Self>> {
        TerminalGuard::enter(self)
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            self.entered = true;
            debug!(target: "terminal", "entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "terminal", "left");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
