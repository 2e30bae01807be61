//! Screen geometry: a one-row tab bar on top, a one-row status line at the
//! bottom and the body in between.
//!
//! Invariants:
//! * Regions never overlap and are expressed in terminal cells.
//! * With fewer than three rows the body is empty (height 0); the tab bar
//!   and status line keep priority.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRegion {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl LayoutRegion {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub tab_bar: LayoutRegion,
    pub body: LayoutRegion,
    pub status: LayoutRegion,
}

impl ScreenLayout {
    pub fn compute(width: u16, height: u16) -> Self {
        let tab_rows = height.min(1);
        let status_rows = height.saturating_sub(tab_rows).min(1);
        let body_rows = height.saturating_sub(tab_rows + status_rows);
        Self {
            tab_bar: LayoutRegion::new(0, 0, width, tab_rows),
            body: LayoutRegion::new(0, tab_rows, width, body_rows),
            status: LayoutRegion::new(0, tab_rows + body_rows, width, status_rows),
        }
    }

    /// Rows available to the editor or the preview.
    pub fn body_rows(&self) -> usize {
        self.body.height as usize
    }
}
