use crate::{NoticeLevel, NoticeQueue, Prompt, Tab};
use core_config::Config;
use core_io::{IoRequest, LoadOrigin, LocationHandle};
use core_model::SyncEngine;
use core_render::{PreviewPane, Renderer};
use core_state::ContentStore;
use core_text::TextArea;
use std::cell::{Cell, Ref};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub default_save_name: String,
    pub notice_ttl: Duration,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            default_save_name: "untitled.md".to_string(),
            notice_ttl: Duration::from_millis(2000),
        }
    }
}

impl ShellSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_save_name: config.default_save_name().to_string(),
            notice_ttl: config.notice_timeout(),
        }
    }
}

/// One editing session: the shared store plus everything that views it.
pub struct Shell {
    pub(crate) store: ContentStore,
    pub(crate) engine: Rc<SyncEngine<TextArea>>,
    pub(crate) preview: PreviewPane,
    pub(crate) tab: Tab,
    pub(crate) prompt: Option<Prompt>,
    pub(crate) notices: NoticeQueue,
    /// Mirrors the last dirty-state signal; only the engine's listener writes it.
    pub(crate) save_visible: Rc<Cell<bool>>,
    pub(crate) settings: ShellSettings,
    pub(crate) body_rows: usize,
}

impl Shell {
    pub fn new(store: ContentStore, renderer: Rc<dyn Renderer>, settings: ShellSettings) -> Self {
        let engine = SyncEngine::attach(store.clone(), TextArea::new());
        let preview = PreviewPane::attach(&store, renderer);
        let save_visible = Rc::new(Cell::new(engine.is_dirty()));
        let flag = save_visible.clone();
        engine.on_dirty_changed(move |dirty| {
            if flag.replace(dirty) != dirty {
                debug!(target: "shell", visible = dirty, "save_affordance");
            }
        });
        info!(target: "shell", len = store.with(str::len), "session_started");
        Self {
            store,
            engine,
            preview,
            tab: Tab::default(),
            prompt: None,
            notices: NoticeQueue::new(settings.notice_ttl),
            save_visible,
            settings,
            body_rows: 1,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn engine(&self) -> &SyncEngine<TextArea> {
        &self.engine
    }

    pub fn editor(&self) -> Ref<'_, TextArea> {
        self.engine.surface()
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn save_visible(&self) -> bool {
        self.save_visible.get()
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn body_rows(&self) -> usize {
        self.body_rows
    }

    /// Record how many rows the body region has and keep the cursor visible.
    pub fn set_viewport(&mut self, rows: usize) {
        self.body_rows = rows.max(1);
        let rows = self.body_rows;
        self.engine.with_surface_mut(|area| area.scroll_into_view(rows));
    }

    /// Load request for a document handed over at startup.
    pub fn open_incoming(&mut self, handle: LocationHandle) -> IoRequest {
        info!(target: "shell", "open_incoming");
        IoRequest::Load {
            handle,
            origin: LoadOrigin::Incoming,
        }
    }

    /// Drop expired notices. Returns whether the status line changed.
    pub fn expire_notices(&mut self, now: Instant) -> bool {
        self.notices.expire(now)
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>, level: NoticeLevel) {
        self.notices.push(message, level, Instant::now());
    }
}
