//! Preview rendering and terminal output primitives.
//!
//! * [`markdown::MarkdownRenderer`] turns Markdown into [`style::StyledText`]
//!   (lines of styled spans) using `pulldown-cmark`.
//! * [`preview::PreviewPane`] keeps the latest rendering of the shared content
//!   store. It only reads the store.
//! * [`writer::Writer`] batches crossterm commands for one frame.
//! * [`layout::ScreenLayout`] splits the terminal into tab bar, body and
//!   status rows.

pub mod layout;
pub mod markdown;
pub mod preview;
pub mod style;
pub mod writer;

pub use markdown::MarkdownRenderer;
pub use preview::PreviewPane;
pub use style::{SpanStyle, StyledLine, StyledSpan, StyledText};

/// Converts document content into a displayable representation.
///
/// Implementations are pure functions of their input.
pub trait Renderer {
    fn render(&self, content: &str) -> StyledText;
}
