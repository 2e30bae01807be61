//! Edit surface ↔ content store synchronization.
//!
//! A [`SyncEngine`] binds exactly one [`EditSurface`] to the shared
//! [`ContentStore`] and keeps the two equal without feedback loops. It also
//! owns the document's dirty flag, which gates the save affordance.
//!
//! State machine
//! -------------
//! Two booleans: `suppress_feedback` and `dirty`.
//!
//! 1. Surface change (`on_text_changed(T)`):
//!    * suppressed: the event is the echo of a store-driven replacement and is
//!      dropped;
//!    * otherwise `store.set(T)`. When that changed the store and the engine
//!      was clean, `dirty` becomes true and a dirty signal is emitted.
//! 2. Store change (`C`, from any other writer or a file load):
//!    * surface already shows `C`: nothing happens (no cursor/scroll reset, no
//!      signal). This is also how our own writes from step 1 come back;
//!    * otherwise, with `suppress_feedback` raised: replace the surface text,
//!      move the cursor to the start, scroll to the top and deliver any echo the
//!      surface produced. Then lower the flag, clear `dirty` and emit a dirty
//!      signal. A store-driven replacement is a new document landing, never an
//!      edit.
//! 3. Attach: empty store is seeded with [`SAMPLE_DOCUMENT`] through step 2;
//!    a non-empty store is pulled into the surface through step 2. Either way
//!    the engine starts clean.
//! 4. Save completed: `dirty` cleared, signal emitted.
//!
//! `suppress_feedback` is the re-entrancy guard that keeps step 2 from ever
//! reaching the store-write branch of step 1. Tests assert it through
//! [`SyncEngine::store_writes`].

use core_state::{ContentStore, Subscription};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

mod sample;
pub use sample::SAMPLE_DOCUMENT;

/// Raw change notification from an edit surface, carrying the surface's full
/// text after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChanged(pub String);

impl TextChanged {
    pub fn text(&self) -> &str {
        &self.0
    }
}

/// The interactive text view a user types into.
///
/// Implementations mirror platform widgets: programmatic replacement may raise
/// the same change notification a keystroke does. Such echoes are returned
/// from [`EditSurface::replace_text`] so the engine can deliver them while its
/// feedback guard is up.
pub trait EditSurface {
    fn text(&self) -> &str;
    /// Replace the whole text. Returns the change notification the surface
    /// raised, if any.
    fn replace_text(&mut self, text: &str) -> Option<TextChanged>;
    fn move_cursor_to_start(&mut self);
    fn scroll_to_top(&mut self);
}

type DirtyListener = Box<dyn Fn(bool)>;

pub struct SyncEngine<S: EditSurface> {
    store: ContentStore,
    surface: RefCell<S>,
    suppress_feedback: Cell<bool>,
    dirty: Cell<bool>,
    listeners: RefCell<Vec<DirtyListener>>,
    store_writes: Cell<u64>,
    subscription: Subscription,
}

impl<S: EditSurface> fmt::Debug for SyncEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("suppress_feedback", &self.suppress_feedback.get())
            .field("dirty", &self.dirty.get())
            .field("store_writes", &self.store_writes.get())
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl<S: EditSurface + 'static> SyncEngine<S> {
    /// Bind `surface` to `store` and run initialization (transition 3).
    pub fn attach(store: ContentStore, surface: S) -> Rc<Self> {
        let engine = Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let subscription = store.subscribe(move |content| {
                if let Some(engine) = weak.upgrade() {
                    engine.on_store_changed(content);
                }
            });
            Self {
                store: store.clone(),
                surface: RefCell::new(surface),
                suppress_feedback: Cell::new(false),
                dirty: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                store_writes: Cell::new(0),
                subscription,
            }
        });
        engine.initialize();
        engine
    }
}

impl<S: EditSurface> SyncEngine<S> {
    fn initialize(&self) {
        if self.store.is_empty() {
            debug!(target: "sync", len = SAMPLE_DOCUMENT.len(), "seed_sample");
            self.store.set(SAMPLE_DOCUMENT);
        } else {
            let current = self.store.get();
            debug!(target: "sync", len = current.len(), "adopt_store_content");
            self.on_store_changed(&current);
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Read access to the surface (painting, cursor queries).
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppress_feedback.get()
    }

    /// Number of store writes performed by the surface-change path.
    pub fn store_writes(&self) -> u64 {
        self.store_writes.get()
    }

    /// Register a dirty-state listener. Listeners run synchronously and must
    /// not register further listeners.
    pub fn on_dirty_changed<F>(&self, listener: F)
    where
        F: Fn(bool) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Apply a user edit to the surface, then forward the change event it
    /// raised (transition 1). Returns whatever `edit` returned.
    pub fn edit<F>(&self, edit: F) -> Option<TextChanged>
    where
        F: FnOnce(&mut S) -> Option<TextChanged>,
    {
        let change = edit(&mut self.surface.borrow_mut());
        if let Some(change) = change.as_ref() {
            self.on_text_changed(change);
        }
        change
    }

    /// Mutate surface view state (cursor, scroll) without touching its text.
    pub fn with_surface_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.surface.borrow_mut())
    }

    /// Transition 1: a raw text-change event from the surface.
    pub fn on_text_changed(&self, change: &TextChanged) {
        if self.suppress_feedback.get() {
            trace!(target: "sync", len = change.0.len(), "echo_suppressed");
            return;
        }
        self.store_writes.set(self.store_writes.get() + 1);
        let changed = self.store.set(change.0.as_str());
        if changed && !self.dirty.get() {
            self.set_dirty(true);
        }
    }

    /// Transition 2: the store changed to `content`.
    pub fn on_store_changed(&self, content: &str) {
        if self.surface.borrow().text() == content {
            trace!(target: "sync", len = content.len(), "surface_in_sync");
            return;
        }
        self.suppress_feedback.set(true);
        let echo = {
            let mut surface = self.surface.borrow_mut();
            let echo = surface.replace_text(content);
            surface.move_cursor_to_start();
            surface.scroll_to_top();
            echo
        };
        if let Some(echo) = echo {
            self.on_text_changed(&echo);
        }
        self.suppress_feedback.set(false);
        debug!(target: "sync", len = content.len(), "store_driven_replace");
        self.set_dirty(false);
    }

    /// Transition 4: the document was written out successfully.
    pub fn mark_saved(&self) {
        debug!(target: "sync", "saved");
        self.set_dirty(false);
    }

    /// A document load completed: install `content` and leave the engine
    /// clean. When the content differs, transition 2 already clears dirty.
    pub fn mark_loaded(&self, content: &str) {
        debug!(target: "sync", len = content.len(), "loaded");
        if !self.store.set(content) && self.dirty.get() {
            self.set_dirty(false);
        }
    }

    fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
        trace!(target: "sync", dirty, "dirty_changed");
        for listener in self.listeners.borrow().iter() {
            listener(dirty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Surface double that behaves like a platform text widget: every text
    /// mutation raises a change event.
    #[derive(Default)]
    struct Surface {
        text: String,
        cursor: usize,
        scroll: usize,
        resets: usize,
    }

    impl Surface {
        fn type_str(&mut self, s: &str) -> Option<TextChanged> {
            self.text.insert_str(self.cursor, s);
            self.cursor += s.len();
            Some(TextChanged(self.text.clone()))
        }
    }

    impl EditSurface for Surface {
        fn text(&self) -> &str {
            &self.text
        }
        fn replace_text(&mut self, text: &str) -> Option<TextChanged> {
            self.text = text.to_string();
            Some(TextChanged(self.text.clone()))
        }
        fn move_cursor_to_start(&mut self) {
            self.cursor = 0;
            self.resets += 1;
        }
        fn scroll_to_top(&mut self) {
            self.scroll = 0;
        }
    }

    fn signals(engine: &SyncEngine<Surface>) -> Rc<RefCell<Vec<bool>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        engine.on_dirty_changed(move |d| sink.borrow_mut().push(d));
        log
    }

    #[test]
    fn attach_seeds_sample_when_store_empty() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        assert_eq!(store.get(), SAMPLE_DOCUMENT);
        assert_eq!(engine.surface().text(), SAMPLE_DOCUMENT);
        assert!(!engine.is_dirty());
        assert_eq!(engine.store_writes(), 0);
    }

    #[test]
    fn attach_adopts_existing_content() {
        let store = ContentStore::with_content("# kept");
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        assert_eq!(store.get(), "# kept");
        assert_eq!(engine.surface().text(), "# kept");
        assert!(!engine.is_dirty());
    }

    #[test]
    fn first_edit_marks_dirty_once() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        engine.with_surface_mut(|s| s.cursor = s.text.len());
        let log = signals(&engine);
        engine.edit(|s| s.type_str("a"));
        engine.edit(|s| s.type_str("b"));
        assert!(engine.is_dirty());
        assert_eq!(*log.borrow(), vec![true]);
        assert_eq!(store.get(), format!("{SAMPLE_DOCUMENT}ab"));
    }

    #[test]
    fn store_driven_update_resets_cursor_and_clears_dirty() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        engine.edit(|s| s.type_str("x"));
        assert!(engine.is_dirty());
        let log = signals(&engine);
        engine.with_surface_mut(|s| {
            s.cursor = 1;
            s.scroll = 4;
        });

        store.set("from elsewhere");
        let surface = engine.surface();
        assert_eq!(surface.text(), "from elsewhere");
        assert_eq!(surface.cursor, 0);
        assert_eq!(surface.scroll, 0);
        drop(surface);
        assert!(!engine.is_dirty());
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn echo_never_writes_back_to_store() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        let revision = store.revision();
        store.set("loaded");
        assert_eq!(engine.store_writes(), 0);
        assert_eq!(store.revision(), revision + 1);
        assert!(!engine.is_suppressing());
    }

    #[test]
    fn equal_store_content_is_noop() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        let log = signals(&engine);
        let resets = engine.surface().resets;
        engine.on_store_changed(SAMPLE_DOCUMENT);
        assert_eq!(engine.surface().resets, resets);
        assert!(log.borrow().is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn store_driven_echo_is_logged_as_suppressed() {
        let buf = LogBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        let writes = engine.store_writes();
        tracing::subscriber::with_default(subscriber, || {
            store.set("from elsewhere");
        });

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("TRACE sync:"), "{out}");
        assert!(out.contains("echo_suppressed"), "{out}");
        assert!(out.contains("store_driven_replace"), "{out}");
        assert_eq!(engine.store_writes(), writes);
    }

    #[test]
    fn mark_saved_clears_dirty() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store, Surface::default());
        engine.edit(|s| s.type_str("x"));
        let log = signals(&engine);
        engine.mark_saved();
        assert!(!engine.is_dirty());
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn mark_loaded_with_identical_content_still_cleans() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        engine.edit(|s| s.type_str("x"));
        let current = store.get();
        let log = signals(&engine);
        engine.mark_loaded(&current);
        assert!(!engine.is_dirty());
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn two_surfaces_share_one_store() {
        let store = ContentStore::new();
        let left = SyncEngine::attach(store.clone(), Surface::default());
        let right = SyncEngine::attach(store.clone(), Surface::default());
        left.edit(|s| s.type_str("> "));
        assert_eq!(right.surface().text(), store.get());
        assert!(left.is_dirty());
        assert!(!right.is_dirty());
        assert_eq!(right.store_writes(), 0);
    }

    #[test]
    fn dropped_engine_stops_observing() {
        let store = ContentStore::new();
        let engine = SyncEngine::attach(store.clone(), Surface::default());
        assert_eq!(store.subscriber_count(), 1);
        drop(engine);
        assert_eq!(store.subscriber_count(), 0);
        store.set("after");
    }
}
