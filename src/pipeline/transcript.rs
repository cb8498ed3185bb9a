//! Per-page transcriptions and their aggregation into one document.

use serde::Serialize;

/// Separator placed between page transcriptions.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Transcriptions in page order. Append-only while the page loop runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pages: Vec<PageTranscript>,
}

/// Markdown returned for one page, exactly as the model sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTranscript {
    /// 0-based page index.
    pub page: usize,
    pub markdown: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next page. Callers push in ascending page order.
    pub fn push(&mut self, page: usize, markdown: String) {
        debug_assert!(self.pages.last().is_none_or(|p| p.page < page));
        self.pages.push(PageTranscript { page, markdown });
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageTranscript] {
        &self.pages
    }

    /// Join all pages with a blank line between entries.
    pub fn join(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.markdown.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }
}
