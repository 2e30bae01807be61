//! Shared document content: a single mutable string slot with ordered change
//! notification.
//!
//! The store is the session's single source of truth for the Markdown text.
//! Edit surfaces, the preview pane and file loading all read and write the same
//! slot through cloned [`ContentStore`] handles.
//!
//! Notification contract:
//! * `set` with content different from the current value notifies every live
//!   subscriber synchronously, in subscription order, before returning.
//! * `set` with equal content does nothing and notifies nobody.
//! * Callbacks run with no internal borrow held, so they may call back into
//!   the store (`get`, `set`, `subscribe`, unsubscribe). A nested `set` runs its
//!   own notification round to completion before the outer round continues.
//! * Unsubscribing is idempotent. A subscription removed while a round is in
//!   progress receives no further callbacks, including in that round.
//!
//! Threading: single logical control thread (`Rc`, not `Send`). Off-thread
//! work must marshal its result back before touching the store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

type Callback = Rc<dyn Fn(&str)>;

/// Identifier of one registration. Ids increase monotonically, so ordering
/// by id is registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner {
    content: RefCell<String>,
    observers: RefCell<BTreeMap<SubscriptionId, Callback>>,
    next_id: Cell<u64>,
    revision: Cell<u64>,
}

/// Cloneable handle to the shared content slot.
#[derive(Clone)]
pub struct ContentStore {
    inner: Rc<StoreInner>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStore")
            .field("len", &self.inner.content.borrow().len())
            .field("subscribers", &self.subscriber_count())
            .field("revision", &self.revision())
            .finish()
    }
}

impl ContentStore {
    /// Empty store with no subscribers.
    pub fn new() -> Self {
        Self::with_content(String::new())
    }

    /// Store pre-populated with `content`. No notification is involved.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                content: RefCell::new(content.into()),
                observers: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(0),
                revision: Cell::new(0),
            }),
        }
    }

    /// Current content (owned copy).
    pub fn get(&self) -> String {
        self.inner.content.borrow().clone()
    }

    /// Borrow the current content without copying. The closure must not call
    /// `set` on this store.
    pub fn with<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.inner.content.borrow().as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.content.borrow().is_empty()
    }

    /// Number of content-changing `set` calls since construction.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Replace the content. Returns `true` when the value changed (and
    /// subscribers were notified), `false` when it was equal.
    pub fn set(&self, content: impl Into<String>) -> bool {
        let content = content.into();
        {
            let mut current = self.inner.content.borrow_mut();
            if *current == content {
                trace!(target: "store", len = content.len(), "set_unchanged");
                return false;
            }
            current.clone_from(&content);
        }
        let revision = self.inner.revision.get() + 1;
        self.inner.revision.set(revision);

        // Snapshot the ids so callbacks can subscribe / unsubscribe freely.
        let ids: Vec<SubscriptionId> = self.inner.observers.borrow().keys().copied().collect();
        trace!(
            target: "store",
            len = content.len(),
            revision,
            subscribers = ids.len(),
            "set_notify"
        );
        for id in ids {
            let callback = self.inner.observers.borrow().get(&id).cloned();
            if let Some(callback) = callback {
                callback(&content);
            }
        }
        true
    }

    /// Register `observer`, invoked with the new content on every changing
    /// `set`. The returned handle unsubscribes when dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&str) + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .insert(id, Rc::new(observer));
        trace!(target: "store", id = id.0, "subscribe");
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
            active: Cell::new(true),
        }
    }

    fn remove(inner: &StoreInner, id: SubscriptionId) -> bool {
        inner.observers.borrow_mut().remove(&id).is_some()
    }
}

/// Registration handle returned by [`ContentStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: SubscriptionId,
    active: Cell<bool>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Stop further callbacks. Safe to call any number of times, including
    /// from inside a callback or after the store is gone.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.store.upgrade()
            && ContentStore::remove(&inner, self.id)
        {
            trace!(target: "store", id = self.id.0, "unsubscribe");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
