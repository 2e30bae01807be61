//! Request / completion pairs exchanged between the UI loop and IO workers.
//!
//! The UI thread builds an [`IoRequest`], a worker runs [`perform`] (blocking),
//! and the resulting [`IoCompletion`] travels back to the UI thread, which is
//! the only place allowed to touch the content store.

use crate::{
    DocumentIo, LoadFailure, LocationHandle, SaveFailure, fallback_display_name, is_markdown,
};
use tracing::{debug, info};

/// Why a load was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// A document handed to the program at startup.
    Incoming,
    /// The user picked a document to import.
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoRequest {
    Load {
        handle: LocationHandle,
        origin: LoadOrigin,
    },
    Save {
        handle: LocationHandle,
        content: String,
        /// Store revision `content` was taken at.
        revision: u64,
    },
}

impl IoRequest {
    /// The completion reported when the worker running this request dies
    /// before producing one.
    pub fn failed(&self) -> IoCompletion {
        match self {
            IoRequest::Load { handle, origin } => IoCompletion::Loaded {
                handle: handle.clone(),
                display_name: fallback_display_name(handle),
                origin: *origin,
                result: Err(LoadFailure),
            },
            IoRequest::Save {
                handle, revision, ..
            } => IoCompletion::Saved {
                handle: handle.clone(),
                display_name: fallback_display_name(handle),
                revision: *revision,
                result: Err(SaveFailure),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoCompletion {
    Loaded {
        handle: LocationHandle,
        display_name: String,
        origin: LoadOrigin,
        result: Result<String, LoadFailure>,
    },
    Saved {
        handle: LocationHandle,
        display_name: String,
        revision: u64,
        result: Result<(), SaveFailure>,
    },
    /// The location is not a Markdown document; nothing was read.
    Rejected {
        display_name: String,
        origin: LoadOrigin,
    },
}

/// Execute `request` against `io`. Blocking.
pub fn perform(io: &dyn DocumentIo, request: IoRequest) -> IoCompletion {
    match request {
        IoRequest::Load { handle, origin } => {
            let described = io.describe(&handle);
            if !is_markdown(&described) {
                info!(
                    target: "io",
                    ?origin,
                    media_type = described.media_type.as_deref(),
                    "load_rejected_not_markdown"
                );
                return IoCompletion::Rejected {
                    display_name: described.display_name,
                    origin,
                };
            }
            let result = io.load(&handle);
            debug!(target: "io", ?origin, ok = result.is_ok(), "load_complete");
            IoCompletion::Loaded {
                handle,
                display_name: described.display_name,
                origin,
                result,
            }
        }
        IoRequest::Save {
            handle,
            content,
            revision,
        } => {
            let display_name = io.describe(&handle).display_name;
            let result = io.save(&handle, &content);
            debug!(target: "io", ok = result.is_ok(), size_bytes = content.len(), "save_complete");
            IoCompletion::Saved {
                handle,
                display_name,
                revision,
                result,
            }
        }
    }
}
