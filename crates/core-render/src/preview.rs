//! Read-only rendered view of the shared content store.
//!
//! The pane renders the store content once on attach (when non-empty) and
//! again on every non-empty update. Empty content never replaces the last
//! rendering. The pane holds a subscription but no write path into the store.

use crate::{Renderer, StyledText};
use core_state::{ContentStore, Subscription};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use tracing::trace;

struct PaneState {
    renderer: Rc<dyn Renderer>,
    rendered: RefCell<StyledText>,
    render_count: Cell<u64>,
}

impl PaneState {
    fn update(&self, content: &str) {
        if content.is_empty() {
            trace!(target: "render.preview", "skip_empty");
            return;
        }
        let text = self.renderer.render(content);
        trace!(target: "render.preview", lines = text.line_count(), "rerender");
        *self.rendered.borrow_mut() = text;
        self.render_count.set(self.render_count.get() + 1);
    }
}

pub struct PreviewPane {
    state: Rc<PaneState>,
    first_line: usize,
    _subscription: Subscription,
}

impl PreviewPane {
    pub fn attach(store: &ContentStore, renderer: Rc<dyn Renderer>) -> Self {
        let state = Rc::new(PaneState {
            renderer,
            rendered: RefCell::new(StyledText::default()),
            render_count: Cell::new(0),
        });
        store.with(|content| state.update(content));
        let weak = Rc::downgrade(&state);
        let subscription = store.subscribe(move |content| {
            if let Some(state) = weak.upgrade() {
                state.update(content);
            }
        });
        Self {
            state,
            first_line: 0,
            _subscription: subscription,
        }
    }

    pub fn rendered(&self) -> Ref<'_, StyledText> {
        self.state.rendered.borrow()
    }

    /// Number of renderings produced since attach.
    pub fn render_count(&self) -> u64 {
        self.state.render_count.get()
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    /// Scroll by `delta` lines, clamped so the last line stays reachable.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.state.rendered.borrow().line_count().saturating_sub(1);
        self.first_line = self.first_line.saturating_add_signed(delta).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.first_line = 0;
    }
}
