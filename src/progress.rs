//! Observer trait for rename pipeline milestones.
//!
//! The library never installs a global logger. It emits `tracing` events and,
//! when one is configured, calls a [`RenameObserver`] passed in through
//! [`crate::config::RenameConfig::observer`]. The `pdfrename` binary uses this
//! to drive a terminal spinner; tests use it to record the order of stages.
//!
//! Every method has a no-op default so implementations override only what
//! they care about.

use std::sync::Arc;

/// Receives pipeline milestones in the order they happen.
///
/// Page indices are 0-based, matching [`crate::config::PageRange`].
pub trait RenameObserver: Send + Sync {
    /// The document is open and the page window is known.
    fn on_document_open(&self, page_count: usize, start: usize, end: usize) {
        let _ = (page_count, start, end);
    }

    /// A page is about to be rendered and sent to the vision model.
    fn on_page_start(&self, page: usize) {
        let _ = page;
    }

    /// A page transcription came back.
    fn on_page_complete(&self, page: usize, markdown_len: usize) {
        let _ = (page, markdown_len);
    }

    /// The aggregated markdown is about to be sent for field extraction.
    fn on_extraction_start(&self, markdown_len: usize) {
        let _ = markdown_len;
    }

    /// The final filename has been rendered.
    fn on_filename(&self, filename: &str) {
        let _ = filename;
    }
}

/// A no-op implementation, used when no observer is configured.
pub struct NoopObserver;

impl RenameObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::RenameConfig`].
pub type ObserverHandle = Arc<dyn RenameObserver>;
