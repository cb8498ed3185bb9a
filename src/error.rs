//! Error types for the edgequake-pdfrename library.
//!
//! The rename pipeline is fail-fast: the first failure at any stage aborts
//! the run and nothing on disk is touched. Every variant of [`RenameError`]
//! therefore maps to exactly one pipeline stage, and page-scoped failures
//! carry the 0-based page index they happened on.
//!
//! [`LlmError`] describes a failed model call and keeps the provider's own
//! `edgequake_llm::LlmError` as its source. It never surfaces on its own;
//! the pipeline wraps it as the `#[source]` of the stage that issued the
//! request.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdfrename library.
#[derive(Debug, Error)]
pub enum RenameError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium for your platform, then either:\n\
  • put libpdfium on the system library search path, or\n\
  • set PDFIUM_LIB_PATH=/path/to/dir-containing-libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("failed to open PDF '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error for a specific page.
    #[error("failed to convert page #{page} to image: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The rendered bitmap could not be JPEG-encoded.
    #[error("failed to encode image #{page}: {source}")]
    EncodeFailed {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The vision model could not transcribe a page.
    #[error("failed to convert image #{page} to markdown: {source}")]
    TranscriptionFailed {
        page: usize,
        #[source]
        source: LlmError,
    },

    /// The text model could not be asked for the filename fields.
    #[error("failed to extract information from markdown: {source}")]
    ExtractionFailed {
        #[source]
        source: LlmError,
    },

    /// The extraction payload is not a flat JSON object of strings.
    #[error("failed to unmarshal JSON payload: {source}\nPayload: {payload}")]
    InvalidExtraction {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Template errors ───────────────────────────────────────────────────
    /// The filename format string does not compile.
    #[error("failed to parse filename format '{format}': {detail}")]
    TemplateCompile { format: String, detail: String },

    /// The compiled format could not be rendered against the fields.
    #[error("failed to execute filename format: {detail}")]
    TemplateRender { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Moving the source file to its new name failed.
    #[error("failed to rename file '{from}' to '{to}': {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the dry-run report.
    #[error("failed to write output: {0}")]
    OutputWriteFailed(#[source] std::io::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure outside the document pipeline (runtime setup).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed model call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected the request or could not be reached.
    #[error("model '{model}': {source}")]
    Provider {
        model: String,
        #[source]
        source: edgequake_llm::LlmError,
    },

    /// No answer arrived within the configured API timeout.
    #[error("model '{model}' did not answer within {secs}s")]
    Timeout { model: String, secs: u64 },

    /// The completion carried no message content.
    #[error("model '{model}' returned an empty completion")]
    EmptyCompletion { model: String },
}

/// Flatten an error and its `source()` chain into a single line.
///
/// tera in particular keeps the useful part of its message (which variable
/// was missing, where parsing stopped) in the source chain.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}
