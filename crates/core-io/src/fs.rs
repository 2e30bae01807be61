//! Local filesystem backend.

use crate::{
    DocumentIo, LoadFailure, LocationHandle, LocationInfo, SaveFailure, fallback_display_name,
    normalize_lines,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Resolves handles as paths; relative ones are joined onto `base_dir`.
#[derive(Debug, Clone)]
pub struct FsDocumentIo {
    base_dir: PathBuf,
}

impl Default for FsDocumentIo {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FsDocumentIo {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve(&self, handle: &LocationHandle) -> PathBuf {
        let path = Path::new(handle.token());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn media_type_for(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md" | "markdown") => "text/markdown",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

impl DocumentIo for FsDocumentIo {
    fn load(&self, handle: &LocationHandle) -> Result<String, LoadFailure> {
        let path = self.resolve(handle);
        match std::fs::read(&path) {
            Ok(bytes) => {
                let size_bytes = bytes.len();
                let text = normalize_lines(&String::from_utf8_lossy(&bytes));
                debug!(target: "io", file = %path.display(), size_bytes, "file_read_ok");
                Ok(text)
            }
            Err(e) => {
                error!(target: "io", file = %path.display(), ?e, "file_read_error");
                Err(LoadFailure)
            }
        }
    }

    fn save(&self, handle: &LocationHandle, content: &str) -> Result<(), SaveFailure> {
        let path = self.resolve(handle);
        match std::fs::write(&path, content.as_bytes()) {
            Ok(()) => {
                debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_write_ok");
                Ok(())
            }
            Err(e) => {
                error!(target: "io", file = %path.display(), ?e, "file_write_error");
                Err(SaveFailure)
            }
        }
    }

    fn describe(&self, handle: &LocationHandle) -> LocationInfo {
        let path = self.resolve(handle);
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_display_name(handle));
        LocationInfo {
            media_type: Some(Self::media_type_for(&path).to_string()),
            display_name,
        }
    }
}
