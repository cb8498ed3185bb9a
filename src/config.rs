//! Configuration types for a PDF rename run.
//!
//! Everything a run needs is carried by [`RenameConfig`], built via its
//! [`RenameConfigBuilder`]. The builder fills in the same defaults as the
//! `pdfrename` binary so library callers only set what differs.

use crate::error::RenameError;
use crate::progress::ObserverHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Default OpenAI-compatible base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model for both transcription and extraction.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default filename format.
pub const DEFAULT_FORMAT: &str = "{{.Title}}.pdf";

/// Configuration for one rename run.
///
/// # Example
/// ```rust
/// use edgequake_pdfrename::{PageRange, RenameConfig};
///
/// let config = RenameConfig::builder()
///     .format("{{.Company | snakecase}}-{{.Date}}.pdf")
///     .page_range(PageRange::new(0, 1).unwrap())
///     .dry_run(true)
///     .build()
///     .unwrap();
/// assert!(config.dry_run);
/// ```
#[derive(Clone)]
pub struct RenameConfig {
    /// Base URL of an OpenAI-compatible server, e.g. `http://localhost:11434/v1`.
    pub endpoint: String,

    /// Bearer credential for `endpoint`. `None` sends no `Authorization` header.
    pub api_key: Option<String>,

    /// Vision model used for page → markdown transcription.
    pub image_model: String,

    /// Text model used for markdown → fields extraction.
    pub text_model: String,

    /// Filename template. Go-style actions (`{{.Title}}`) and tera syntax are both accepted.
    pub format: String,

    /// Free-text guidance appended to the extraction instruction.
    pub prompt: String,

    /// Print the rendered name instead of renaming.
    pub dry_run: bool,

    /// Pages to transcribe (0-based, inclusive).
    pub page_range: PageRange,

    /// Longest edge of a rendered page in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory (or file) holding the pdfium shared library.
    /// `None` binds to the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Per-request timeout in seconds. `None` waits indefinitely.
    pub api_timeout_secs: Option<u64>,

    /// Receives pipeline milestones.
    pub observer: Option<ObserverHandle>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            image_model: DEFAULT_MODEL.to_string(),
            text_model: DEFAULT_MODEL.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            prompt: String::new(),
            dry_run: false,
            page_range: PageRange::default(),
            max_rendered_pixels: 2000,
            password: None,
            pdfium_lib_path: None,
            api_timeout_secs: None,
            observer: None,
        }
    }
}

impl fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .field("format", &self.format)
            .field("prompt", &self.prompt)
            .field("dry_run", &self.dry_run)
            .field("page_range", &self.page_range)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn RenameObserver>"))
            .finish()
    }
}

impl RenameConfig {
    /// Create a new builder for `RenameConfig`.
    pub fn builder() -> RenameConfigBuilder {
        RenameConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RenameConfig`].
#[derive(Debug)]
pub struct RenameConfigBuilder {
    config: RenameConfig,
}

impl RenameConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn page_range(mut self, range: PageRange) -> Self {
        self.config.page_range = range;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn observer(mut self, observer: ObserverHandle) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenameConfig, RenameError> {
        let c = &self.config;
        if c.endpoint.trim().is_empty() {
            return Err(RenameError::InvalidConfig("endpoint must not be empty".into()));
        }
        if c.image_model.trim().is_empty() || c.text_model.trim().is_empty() {
            return Err(RenameError::InvalidConfig(
                "image and text model names are required".into(),
            ));
        }
        if c.format.trim().is_empty() {
            return Err(RenameError::InvalidConfig("filename format must not be empty".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(RenameError::InvalidConfig("API timeout must be ≥ 1 second".into()));
        }
        Ok(self.config)
    }
}

// ── Page range ───────────────────────────────────────────────────────────

/// How a textual page-range spec is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageRangeMode {
    /// The historical parser: `"N"` always means 0-0 and `"N-M"` means N-N.
    /// Malformed numbers silently become 0. (default)
    #[default]
    Compat,
    /// `"N"` means N-N, `"N-M"` means N-M. Malformed input is an error.
    Inclusive,
}

/// Inclusive, 0-based page window used to filter the page loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: usize, end: usize) -> Result<Self, RenameError> {
        if end < start {
            return Err(RenameError::InvalidConfig(format!(
                "Invalid page range '{start}-{end}': start must be <= end"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range spec according to `mode`.
    pub fn parse(spec: &str, mode: PageRangeMode) -> Result<Self, RenameError> {
        match mode {
            PageRangeMode::Compat => Ok(Self::parse_compat(spec)),
            PageRangeMode::Inclusive => Self::parse_inclusive(spec),
        }
    }

    /// The historical parser. Never fails.
    ///
    /// A single number selects page 0 only, and in `"N-M"` the end bound is
    /// taken from `N`; `M` is ignored. Each part is parsed without trimming
    /// and anything unparsable counts as 0.
    pub fn parse_compat(spec: &str) -> Self {
        let parts: Vec<&str> = spec.split('-').collect();
        match parts.as_slice() {
            [_] => Self { start: 0, end: 0 },
            [first, second] => {
                let start = first.parse::<usize>().unwrap_or(0);
                let ignored = second.parse::<usize>().unwrap_or(0);
                if ignored != start {
                    warn!(
                        spec,
                        start,
                        end = start,
                        ignored,
                        "page range end bound ignored; use --page-range-mode inclusive to honour it"
                    );
                }
                Self { start, end: start }
            }
            _ => Self { start: 0, end: 0 },
        }
    }

    fn parse_inclusive(spec: &str) -> Result<Self, RenameError> {
        let parse_bound = |s: &str| {
            s.trim().parse::<usize>().map_err(|_| {
                RenameError::InvalidConfig(format!("Invalid page number '{}' in range '{spec}'", s.trim()))
            })
        };

        match spec.split_once('-') {
            Some((start, end)) => Self::new(parse_bound(start)?, parse_bound(end)?),
            None => {
                let page = parse_bound(spec)?;
                Self::new(page, page)
            }
        }
    }

    /// `true` while `index` has not reached `start`.
    pub fn is_before(&self, index: usize) -> bool {
        index < self.start
    }

    /// `true` once `index` has moved past `end`.
    pub fn is_past(&self, index: usize) -> bool {
        self.end < index
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compat_single_number_is_always_first_page() {
        assert_eq!(PageRange::parse_compat("1"), PageRange { start: 0, end: 0 });
        assert_eq!(PageRange::parse_compat("7"), PageRange { start: 0, end: 0 });
        assert_eq!(PageRange::parse_compat("abc"), PageRange { start: 0, end: 0 });
    }

    #[test]
    fn compat_pair_uses_first_number_for_both_bounds() {
        assert_eq!(PageRange::parse_compat("2-5"), PageRange { start: 2, end: 2 });
        assert_eq!(PageRange::parse_compat("0-1"), PageRange { start: 0, end: 0 });
    }

    #[test]
    fn compat_malformed_defaults_to_zero() {
        assert_eq!(PageRange::parse_compat("x-3"), PageRange { start: 0, end: 0 });
        assert_eq!(PageRange::parse_compat(" 3-4"), PageRange { start: 0, end: 0 });
        assert_eq!(PageRange::parse_compat("1-2-3"), PageRange { start: 0, end: 0 });
        assert_eq!(PageRange::parse_compat("-5"), PageRange { start: 0, end: 0 });
    }

    #[test]
    fn inclusive_honours_both_bounds() {
        let r = PageRange::parse("0-1", PageRangeMode::Inclusive).unwrap();
        assert_eq!(r, PageRange { start: 0, end: 1 });
        let r = PageRange::parse(" 3 ", PageRangeMode::Inclusive).unwrap();
        assert_eq!(r, PageRange { start: 3, end: 3 });
    }

    #[test]
    fn inclusive_rejects_bad_input() {
        assert!(PageRange::parse("5-2", PageRangeMode::Inclusive).is_err());
        assert!(PageRange::parse("a-2", PageRangeMode::Inclusive).is_err());
        assert!(PageRange::parse("", PageRangeMode::Inclusive).is_err());
    }

    #[test]
    fn window_predicates() {
        let r = PageRange::new(1, 2).unwrap();
        assert!(r.is_before(0));
        assert!(!r.is_before(1));
        assert!(!r.is_past(2));
        assert!(r.is_past(3));
    }

    #[test]
    fn builder_defaults_match_cli() {
        let c = RenameConfig::default();
        assert_eq!(c.image_model, "gpt-4o-mini");
        assert_eq!(c.text_model, "gpt-4o-mini");
        assert_eq!(c.format, "{{.Title}}.pdf");
        assert_eq!(c.page_range, PageRange { start: 0, end: 0 });
        assert!(!c.dry_run);
    }

    #[test]
    fn builder_rejects_empty_format() {
        assert!(RenameConfig::builder().format("  ").build().is_err());
    }

    #[test]
    fn builder_treats_empty_api_key_as_none() {
        let c = RenameConfig::builder().api_key("").build().unwrap();
        assert!(c.api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = RenameConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
