//! Completions coming back from the IO worker.
//!
//! Failures become notices and never reach the sync engine: a failed load
//! leaves the store alone, a failed save leaves the dirty flag alone. A save
//! only cleans the document when the store has not moved on since the
//! snapshot was taken.

use crate::{NoticeLevel, Shell, Tab};
use core_io::{IoCompletion, LoadOrigin};
use tracing::{debug, info, warn};

pub(crate) const SAVED_NOTICE: &str = "Saved";
pub(crate) const SAVE_FAILED_NOTICE: &str = "Save failed";
pub(crate) const IMPORT_FAILED_NOTICE: &str = "Import failed";

impl Shell {
    pub fn complete_io(&mut self, completion: IoCompletion) {
        match completion {
            IoCompletion::Loaded {
                display_name,
                origin,
                result: Ok(content),
                ..
            } => {
                info!(target: "shell.io", ?origin, size_bytes = content.len(), "document_loaded");
                self.engine.mark_loaded(&content);
                self.preview.scroll_to_top();
                self.tab = Tab::Edit;
                self.notify(format!("{display_name} imported"), NoticeLevel::Info);
            }
            IoCompletion::Loaded {
                origin,
                result: Err(_),
                ..
            } => {
                warn!(target: "shell.io", ?origin, "document_load_failed");
                self.notify(IMPORT_FAILED_NOTICE, NoticeLevel::Error);
            }
            IoCompletion::Saved {
                revision,
                result: Ok(()),
                ..
            } => {
                let current = self.store.revision();
                info!(target: "shell.io", revision, current, "document_saved");
                if revision == current {
                    self.engine.mark_saved();
                } else {
                    debug!(target: "shell.io", revision, current, "saved_snapshot_stale");
                }
                self.notify(SAVED_NOTICE, NoticeLevel::Info);
            }
            IoCompletion::Saved {
                result: Err(_), ..
            } => {
                warn!(target: "shell.io", dirty = self.engine.is_dirty(), "document_save_failed");
                self.notify(SAVE_FAILED_NOTICE, NoticeLevel::Error);
            }
            IoCompletion::Rejected {
                display_name,
                origin: LoadOrigin::Import,
            } => {
                self.notify(
                    format!("{display_name} is not a Markdown file"),
                    NoticeLevel::Error,
                );
            }
            IoCompletion::Rejected {
                origin: LoadOrigin::Incoming,
                ..
            } => {
                warn!(target: "shell.io", "incoming_document_not_markdown");
            }
        }
    }
}
