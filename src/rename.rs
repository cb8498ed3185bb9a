//! Rename entry points and the page loop that drives the stages.
//!
//! [`rename`] wires the production stages together: pdfium for pages, an
//! edgequake-llm provider per model and the filesystem for the final move.
//! [`Pipeline`] is generic over the stage traits, so tests run the whole
//! flow against canned stand-ins.
//!
//! The run is strictly sequential and fail-fast. Pages are transcribed one
//! at a time in ascending order, and the first error anywhere returns before
//! the file on disk is touched.

use crate::config::{PageRange, RenameConfig};
use crate::error::RenameError;
use crate::output::RenameOutcome;
use crate::pipeline::encode::encode_page;
use crate::pipeline::extract::{parse_fields, ExtractedFields};
use crate::pipeline::finish::{self, FileMover, FsMover};
use crate::pipeline::input;
use crate::pipeline::llm::{self, Extractor, FieldExtractor, Transcriber, VisionTranscriber};
use crate::pipeline::render::{self, PageSource, PdfiumDocument};
use crate::pipeline::template::FilenameTemplate;
use crate::pipeline::transcript::Transcript;
use crate::progress::{NoopObserver, RenameObserver};
use crate::prompts::{self, TRANSCRIPTION_PROMPT_VERSION};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Rename a PDF from its own content.
///
/// In a dry run the rendered filename is printed to stdout followed by a
/// newline and nothing is moved. Otherwise the file is renamed in place,
/// next to where it was.
///
/// # Errors
/// Every failure is fatal and leaves the file untouched. Page-scoped errors
/// ([`RenameError::RasterisationFailed`], [`RenameError::TranscriptionFailed`])
/// carry the 0-based index of the page that failed.
pub async fn rename(
    input_path: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<RenameOutcome, RenameError> {
    let mut stdout = std::io::stdout();
    rename_with_output(input_path, config, &mut stdout).await
}

/// Like [`rename`], writing the dry-run report to `out` instead of stdout.
pub async fn rename_with_output(
    input_path: impl AsRef<Path>,
    config: &RenameConfig,
    out: &mut dyn Write,
) -> Result<RenameOutcome, RenameError> {
    let started = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    let path = input::resolve_input(input_path.as_ref())?;

    // ── Step 2: Compile the format before any paid call ──────────────────
    let template = FilenameTemplate::compile(&config.format)?;

    info!(
        path = %path.display(),
        format = %config.format,
        pages = %config.page_range,
        dry_run = config.dry_run,
        prompt_version = TRANSCRIPTION_PROMPT_VERSION,
        "rename.start"
    );

    // ── Step 3: Build the model providers ────────────────────────────────
    let timeout = config.api_timeout_secs.map(Duration::from_secs);
    let api_key = config.api_key.as_deref();
    let transcriber = VisionTranscriber::new(
        llm::openai_compatible(&config.endpoint, api_key, &config.image_model),
        timeout,
    );
    let extractor = FieldExtractor::new(
        llm::openai_compatible(&config.endpoint, api_key, &config.text_model),
        prompts::extraction_prompt(&config.prompt, &config.format),
        timeout,
    );

    // ── Step 4: Open the document ────────────────────────────────────────
    let pdfium = render::bind_pdfium(config.pdfium_lib_path.as_deref())?;
    let document = PdfiumDocument::open(
        &pdfium,
        &path,
        config.password.as_deref(),
        config.max_rendered_pixels,
    )?;

    // ── Step 5: Run the stages ───────────────────────────────────────────
    let observer: &dyn RenameObserver = match &config.observer {
        Some(obs) => obs.as_ref(),
        None => &NoopObserver,
    };
    let pipeline = Pipeline {
        document,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &FsMover,
        page_range: config.page_range,
        dry_run: config.dry_run,
        observer,
    };
    let outcome = pipeline.run(&path, out).await?;

    info!(
        action = ?outcome.action,
        target = %outcome.target.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rename.complete"
    );
    Ok(outcome)
}

/// Synchronous wrapper around [`rename`].
///
/// Creates a single-threaded tokio runtime internally.
pub fn rename_sync(
    input_path: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<RenameOutcome, RenameError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RenameError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(rename(input_path, config))
}

// ── Pipeline ─────────────────────────────────────────────────────────────

/// One run's worth of stages.
///
/// The document is owned and closed as soon as the last page is transcribed,
/// before the file is renamed.
pub struct Pipeline<'a, D, T, E, M: ?Sized> {
    pub document: D,
    pub transcriber: &'a T,
    pub extractor: &'a E,
    pub template: &'a FilenameTemplate,
    pub mover: &'a M,
    pub page_range: PageRange,
    pub dry_run: bool,
    pub observer: &'a dyn RenameObserver,
}

impl<D, T, E, M> Pipeline<'_, D, T, E, M>
where
    D: PageSource,
    T: Transcriber,
    E: Extractor,
    M: FileMover + ?Sized,
{
    /// Transcribe, extract, render, then print or rename `source`.
    pub async fn run(self, source: &Path, out: &mut dyn Write) -> Result<RenameOutcome, RenameError> {
        let Pipeline {
            document,
            transcriber,
            extractor,
            template,
            mover,
            page_range,
            dry_run,
            observer,
        } = self;

        let transcript = transcribe_pages(&document, transcriber, page_range, observer).await?;
        drop(document);

        let markdown = transcript.join();
        let fields = extract_fields(extractor, &markdown, observer).await?;

        let filename = template.render(&fields)?;
        if filename.trim().is_empty() {
            return Err(RenameError::TemplateRender {
                detail: format!("format '{}' rendered an empty filename", template.format()),
            });
        }
        info!(filename = %filename, "filename");
        observer.on_filename(&filename);

        let (target, action) = finish::finish(source, &filename, dry_run, mover, out)?;

        Ok(RenameOutcome {
            source: source.to_path_buf(),
            filename,
            target,
            fields,
            pages_transcribed: transcript.len(),
            markdown,
            action,
        })
    }
}

/// Walk the pages in order, transcribing those inside `range`.
async fn transcribe_pages<D, T>(
    document: &D,
    transcriber: &T,
    range: PageRange,
    observer: &dyn RenameObserver,
) -> Result<Transcript, RenameError>
where
    D: PageSource,
    T: Transcriber,
{
    let page_count = document.page_count();
    info!(pages = page_count, start = range.start, end = range.end, "pdf.process");
    observer.on_document_open(page_count, range.start, range.end);

    let mut transcript = Transcript::new();
    for page in 0..page_count {
        if range.is_before(page) {
            info!(page, "pdf.skip");
            continue;
        }
        if range.is_past(page) {
            info!(page, "pdf.end");
            break;
        }

        observer.on_page_start(page);
        info!(page, "pdf.open");

        let image = document.render_page(page)?;
        let encoded =
            encode_page(&image).map_err(|source| RenameError::EncodeFailed { page, source })?;
        info!(page, bytes = encoded.data.len(), "pdf.image");

        let markdown = transcriber
            .transcribe(page, encoded)
            .await
            .map_err(|source| RenameError::TranscriptionFailed { page, source })?;
        info!(page, chars = markdown.len(), "pdf.markdown");
        debug!(page, markdown = %markdown, "pdf.markdown.body");

        observer.on_page_complete(page, markdown.len());
        transcript.push(page, markdown);
    }

    if transcript.is_empty() {
        warn!(
            pages = page_count,
            start = range.start,
            "no page fell inside the page range; extracting from empty markdown"
        );
    }
    Ok(transcript)
}

/// Ask the text model for the fields and decode its payload.
async fn extract_fields<E: Extractor>(
    extractor: &E,
    markdown: &str,
    observer: &dyn RenameObserver,
) -> Result<ExtractedFields, RenameError> {
    observer.on_extraction_start(markdown.len());
    info!(chars = markdown.len(), "extract");

    let payload = extractor
        .extract(markdown)
        .await
        .map_err(|source| RenameError::ExtractionFailed { source })?;
    debug!(payload = %payload, "extract.payload");

    let fields = parse_fields(&payload)?;
    info!(fields = ?fields, "extracted");
    Ok(fields)
}
