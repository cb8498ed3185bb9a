//! Input validation: make sure the path names a readable PDF before any
//! pdfium or network work starts.
//!
//! Checking the `%PDF` magic bytes here gives callers a clear error instead
//! of an opaque pdfium failure, and it runs before pdfium is even bound so a
//! typo in the path never costs a library load.

use crate::error::RenameError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn resolve_input(path: &Path) -> Result<PathBuf, RenameError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(RenameError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(RenameError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(RenameError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(RenameError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
