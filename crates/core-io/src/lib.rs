//! Document import/export seam.
//!
//! The editor core never touches files directly. It hands an opaque
//! [`LocationHandle`] to a [`DocumentIo`] backend and gets back either the text
//! or an opaque failure. Backends own every detail of what a handle means.
//!
//! Loading normalizes line endings: every line read (split on `\n`, `\r\n` or
//! a lone `\r`) is terminated with `\n`, the final line included. Saving
//! writes the content verbatim.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod fs;
mod naming;
mod request;

pub use fs::FsDocumentIo;
pub use naming::{ensure_markdown_extension, has_markdown_extension, is_markdown};
pub use request::{IoCompletion, IoRequest, LoadOrigin, perform};

/// Opaque reference to a user-chosen document location.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LocationHandle(String);

impl LocationHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocationHandle").field(&self.0).finish()
    }
}

impl From<&str> for LocationHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LocationHandle {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Path> for LocationHandle {
    fn from(value: &Path) -> Self {
        Self::new(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for LocationHandle {
    fn from(value: PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

/// What a backend can tell about a location before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    /// Declared media type, when the backend knows one.
    pub media_type: Option<String>,
    /// Name suitable for user-facing messages.
    pub display_name: String,
}

/// Display name used when neither the backend nor the handle yields one.
pub const UNKNOWN_DISPLAY_NAME: &str = "unknown file";

/// A load did not produce text. The cause is logged by the backend and is not
/// available to the caller.
#[derive(Debug, Error, Default, Clone, PartialEq, Eq)]
#[error("document could not be loaded")]
pub struct LoadFailure;

/// A save did not complete. The cause is logged by the backend.
#[derive(Debug, Error, Default, Clone, PartialEq, Eq)]
#[error("document could not be saved")]
pub struct SaveFailure;

/// Storage backend for documents.
pub trait DocumentIo: Send + Sync {
    /// Read the full text at `handle`, line-normalized.
    fn load(&self, handle: &LocationHandle) -> Result<String, LoadFailure>;
    /// Write `content` verbatim to `handle`.
    fn save(&self, handle: &LocationHandle, content: &str) -> Result<(), SaveFailure>;
    /// Describe `handle` without reading its content.
    fn describe(&self, handle: &LocationHandle) -> LocationInfo;
}

/// Terminate every line with `\n`.
///
/// Accepts `\n`, `\r\n` and lone `\r` as line terminators. An unterminated
/// final line gets a `\n`; empty input stays empty.
pub fn normalize_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 1);
    let mut chars = input.chars().peekable();
    let mut at_line_start = true;
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
                at_line_start = true;
            }
            '\n' => {
                out.push('\n');
                at_line_start = true;
            }
            other => {
                out.push(other);
                at_line_start = false;
            }
        }
    }
    if !at_line_start {
        out.push('\n');
    }
    out
}

/// Last non-empty `/` or `\` separated segment of a handle, used when the
/// backend cannot name the location itself.
pub fn fallback_display_name(handle: &LocationHandle) -> String {
    handle
        .token()
        .rsplit(['/', '\\'])
        .find(|seg| !seg.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string())
}
