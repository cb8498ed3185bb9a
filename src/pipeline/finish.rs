//! Terminal step: report the rendered name or move the source file to it.
//!
//! `std::fs::rename` silently replaces an existing target on Unix, so
//! [`FsMover`] checks for the target first. The check and the rename are not
//! one atomic operation; a file created in between is still overwritten.
//!
//! On a case-insensitive filesystem `invoice.pdf` → `Invoice.pdf` finds the
//! source itself at the target path. That case-only rename is allowed.

use crate::error::RenameError;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Moves a file to a new path.
pub trait FileMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Filesystem mover that refuses to overwrite an existing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl FileMover for FsMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.symlink_metadata().is_ok() && !is_case_only_rename(from, to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' already exists", to.display()),
            ));
        }
        std::fs::rename(from, to)
    }
}

/// `to` differs from `from` only in the case of its file name and both
/// resolve to the same file.
fn is_case_only_rename(from: &Path, to: &Path) -> bool {
    let names_match = match (from.file_name(), to.file_name()) {
        (Some(a), Some(b)) => a != b && a.eq_ignore_ascii_case(b),
        _ => false,
    };
    names_match && from.parent() == to.parent() && same_file(from, to)
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// What the terminal step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameAction {
    /// Dry run: the name was printed, nothing moved.
    Printed,
    /// The source now lives at the target path.
    Renamed,
    /// The rendered name is the file's current name.
    Unchanged,
}

/// Where `filename` lands: next to `source`.
pub fn target_path(source: &Path, filename: &str) -> PathBuf {
    match source.parent() {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Print (dry run) or rename. Returns the target path and the action taken.
pub fn finish<M: FileMover + ?Sized, W: Write + ?Sized>(
    source: &Path,
    filename: &str,
    dry_run: bool,
    mover: &M,
    out: &mut W,
) -> Result<(PathBuf, RenameAction), RenameError> {
    let target = target_path(source, filename);

    if dry_run {
        writeln!(out, "{filename}").map_err(RenameError::OutputWriteFailed)?;
        info!(from = %source.display(), to = %target.display(), "rename.dry_run");
        return Ok((target, RenameAction::Printed));
    }

    if target == source {
        info!(path = %source.display(), "rename.unchanged");
        return Ok((target, RenameAction::Unchanged));
    }

    mover
        .rename(source, &target)
        .map_err(|e| RenameError::RenameFailed {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;

    info!(from = %source.display(), to = %target.display(), "rename.done");
    Ok((target, RenameAction::Renamed))
}
