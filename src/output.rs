//! Result of a rename run.

use crate::pipeline::extract::ExtractedFields;
pub use crate::pipeline::finish::RenameAction;
use serde::Serialize;
use std::path::PathBuf;

/// Everything a successful run produced.
///
/// Serialised as-is by `pdfrename --json`.
#[derive(Debug, Clone, Serialize)]
pub struct RenameOutcome {
    /// The PDF the run started from.
    pub source: PathBuf,

    /// Rendered filename, exactly as the template produced it.
    pub filename: String,

    /// `filename` resolved next to `source`.
    pub target: PathBuf,

    /// Fields returned by the text model.
    pub fields: ExtractedFields,

    /// Number of pages sent to the vision model.
    pub pages_transcribed: usize,

    /// Aggregated markdown the fields were extracted from.
    pub markdown: String,

    pub action: RenameAction,
}

impl RenameOutcome {
    /// `true` when the file on disk now lives at [`Self::target`].
    pub fn renamed(&self) -> bool {
        self.action == RenameAction::Renamed
    }
}
