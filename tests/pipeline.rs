//! Integration tests for the rename pipeline with stubbed stages.
//!
//! pdfium and the model endpoints are replaced by in-memory stand-ins so the
//! page loop, aggregation, extraction, rendering and the final move can be
//! checked without a PDF engine or network access.

use edgequake_llm::ImageData;
use edgequake_pdfrename::pipeline::finish::{FileMover, FsMover};
use edgequake_pdfrename::pipeline::llm::{Extractor, Transcriber};
use edgequake_pdfrename::pipeline::render::PageSource;
use edgequake_pdfrename::{
    FilenameTemplate, LlmError, NoopObserver, PageRange, PageRangeMode, Pipeline, RenameAction,
    RenameError, RenameObserver,
};
use image::DynamicImage;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Document whose pages render to blank bitmaps.
struct StubDocument {
    pages: usize,
    fail_on: Option<usize>,
    rendered: Mutex<Vec<usize>>,
}

impl StubDocument {
    fn new(pages: usize) -> Self {
        Self {
            pages,
            fail_on: None,
            rendered: Mutex::new(Vec::new()),
        }
    }
}

impl PageSource for &StubDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, RenameError> {
        self.rendered.lock().unwrap().push(index);
        if self.fail_on == Some(index) {
            return Err(RenameError::RasterisationFailed {
                page: index,
                detail: "broken content stream".into(),
            });
        }
        Ok(DynamicImage::new_rgb8(8, 8))
    }
}

/// Returns `"a"`, `"b"`, `"c"`, ... for pages 0, 1, 2, ...
#[derive(Default)]
struct StubTranscriber {
    seen: Mutex<Vec<usize>>,
    fail_on: Option<usize>,
}

impl Transcriber for StubTranscriber {
    async fn transcribe(&self, page: usize, image: ImageData) -> Result<String, LlmError> {
        assert_eq!(image.mime_type, "image/jpeg");
        self.seen.lock().unwrap().push(page);
        if self.fail_on == Some(page) {
            return Err(LlmError::Provider {
                model: "stub-vision".into(),
                source: edgequake_llm::LlmError::ApiError("500 model crashed".into()),
            });
        }
        Ok(((b'a' + page as u8) as char).to_string())
    }
}

/// Answers every extraction with a canned payload.
struct StubExtractor {
    payload: &'static str,
    calls: AtomicUsize,
    received: Mutex<Option<String>>,
}

impl StubExtractor {
    fn new(payload: &'static str) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
            received: Mutex::new(None),
        }
    }
}

impl Extractor for StubExtractor {
    async fn extract(&self, markdown: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.received.lock().unwrap() = Some(markdown.to_string());
        Ok(self.payload.to_string())
    }
}

/// Records moves without touching the filesystem.
#[derive(Default)]
struct RecordingMover {
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FileMover for RecordingMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl RenameObserver for EventLog {
    fn on_document_open(&self, page_count: usize, start: usize, end: usize) {
        self.push(format!("open {page_count} {start}-{end}"));
    }

    fn on_page_start(&self, page: usize) {
        self.push(format!("page {page}"));
    }

    fn on_page_complete(&self, page: usize, markdown_len: usize) {
        self.push(format!("done {page} {markdown_len}"));
    }

    fn on_extraction_start(&self, markdown_len: usize) {
        self.push(format!("extract {markdown_len}"));
    }

    fn on_filename(&self, filename: &str) {
        self.push(format!("name {filename}"));
    }
}

impl EventLog {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

const SOURCE: &str = "/docs/scan0042.pdf";

fn range(start: usize, end: usize) -> PageRange {
    PageRange::new(start, end).unwrap()
}

// ── Page loop ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_pages_inside_range_are_transcribed() {
    let doc = StubDocument::new(3);
    let transcriber = StubTranscriber::default();
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();

    let mut out = Vec::new();
    let outcome = Pipeline {
        document: &doc,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: range(0, 1),
        dry_run: true,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut out)
    .await
    .unwrap();

    assert_eq!(*transcriber.seen.lock().unwrap(), vec![0, 1]);
    assert_eq!(*doc.rendered.lock().unwrap(), vec![0, 1]);
    assert_eq!(outcome.markdown, "a\n\nb");
    assert_eq!(outcome.pages_transcribed, 2);
    assert_eq!(extractor.received.lock().unwrap().as_deref(), Some("a\n\nb"));
}

#[tokio::test]
async fn range_starting_mid_document_skips_leading_pages() {
    let doc = StubDocument::new(5);
    let transcriber = StubTranscriber::default();
    let extractor = StubExtractor::new(r#"{"Title": "Report"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();

    let outcome = Pipeline {
        document: &doc,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &RecordingMover::default(),
        page_range: range(2, 3),
        dry_run: true,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut Vec::new())
    .await
    .unwrap();

    assert_eq!(*transcriber.seen.lock().unwrap(), vec![2, 3]);
    assert_eq!(outcome.markdown, "c\n\nd");
}

#[tokio::test]
async fn compat_range_transcribes_first_bound_only() {
    let doc = StubDocument::new(3);
    let transcriber = StubTranscriber::default();
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();

    Pipeline {
        document: &doc,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &RecordingMover::default(),
        page_range: PageRange::parse("0-1", PageRangeMode::Compat).unwrap(),
        dry_run: true,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut Vec::new())
    .await
    .unwrap();

    assert_eq!(*transcriber.seen.lock().unwrap(), vec![0]);
}

// ── Finish ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dry_run_prints_name_and_never_moves() {
    let doc = StubDocument::new(1);
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();

    let mut out = Vec::new();
    let outcome = Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: PageRange::default(),
        dry_run: true,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut out)
    .await
    .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Invoice.pdf\n");
    assert!(mover.calls.lock().unwrap().is_empty());
    assert_eq!(outcome.action, RenameAction::Printed);
    assert_eq!(outcome.filename, "Invoice.pdf");
}

#[tokio::test]
async fn rename_moves_once_to_sibling_path() {
    let doc = StubDocument::new(1);
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();

    let mut out = Vec::new();
    let outcome = Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: PageRange::default(),
        dry_run: false,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut out)
    .await
    .unwrap();

    assert!(out.is_empty());
    assert_eq!(
        *mover.calls.lock().unwrap(),
        vec![(PathBuf::from(SOURCE), PathBuf::from("/docs/Invoice.pdf"))]
    );
    assert_eq!(outcome.action, RenameAction::Renamed);
    assert_eq!(outcome.target, PathBuf::from("/docs/Invoice.pdf"));
}

#[tokio::test]
async fn rename_on_disk_with_fs_mover() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan0042.pdf");
    std::fs::write(&source, b"%PDF-1.7\n").unwrap();

    let doc = StubDocument::new(1);
    let extractor = StubExtractor::new(r#"{"Company": "Acme Corp", "Date": "2024-01-31"}"#);
    let template = FilenameTemplate::compile("{{.Company | snakecase}}-{{.Date}}.pdf").unwrap();

    let outcome = Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &FsMover,
        page_range: PageRange::default(),
        dry_run: false,
        observer: &NoopObserver,
    }
    .run(&source, &mut Vec::new())
    .await
    .unwrap();

    let expected = dir.path().join("acme_corp-2024-01-31.pdf");
    assert_eq!(outcome.target, expected);
    assert!(!source.exists());
    assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-1.7\n");
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn transcription_failure_stops_before_extraction() {
    let doc = StubDocument::new(5);
    let transcriber = StubTranscriber {
        fail_on: Some(2),
        ..Default::default()
    };
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();

    let mut out = Vec::new();
    let err = Pipeline {
        document: &doc,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: range(0, 4),
        dry_run: false,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut out)
    .await
    .unwrap_err();

    match err {
        RenameError::TranscriptionFailed { page, .. } => assert_eq!(page, 2),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(*transcriber.seen.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    assert!(mover.calls.lock().unwrap().is_empty());
    assert!(out.is_empty());
}

#[tokio::test]
async fn render_failure_names_page_and_skips_transcription() {
    let doc = StubDocument {
        fail_on: Some(1),
        ..StubDocument::new(3)
    };
    let transcriber = StubTranscriber::default();
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();

    let err = Pipeline {
        document: &doc,
        transcriber: &transcriber,
        extractor: &extractor,
        template: &template,
        mover: &RecordingMover::default(),
        page_range: range(0, 2),
        dry_run: true,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut Vec::new())
    .await
    .unwrap_err();

    assert!(matches!(err, RenameError::RasterisationFailed { page: 1, .. }));
    assert_eq!(*transcriber.seen.lock().unwrap(), vec![0]);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_payload_aborts_before_rendering() {
    let doc = StubDocument::new(1);
    let extractor = StubExtractor::new("Title: Invoice");
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();
    let log = EventLog::default();

    let mut out = Vec::new();
    let err = Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: PageRange::default(),
        dry_run: false,
        observer: &log,
    }
    .run(Path::new(SOURCE), &mut out)
    .await
    .unwrap_err();

    assert!(matches!(err, RenameError::InvalidExtraction { .. }));
    assert!(mover.calls.lock().unwrap().is_empty());
    assert!(out.is_empty());
    assert!(!log
        .events
        .lock()
        .unwrap()
        .iter()
        .any(|e| e.starts_with("name ")));
}

#[tokio::test]
async fn missing_field_is_render_error() {
    let doc = StubDocument::new(1);
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Company}}-{{.Title}}.pdf").unwrap();
    let mover = RecordingMover::default();

    let err = Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &mover,
        page_range: PageRange::default(),
        dry_run: false,
        observer: &NoopObserver,
    }
    .run(Path::new(SOURCE), &mut Vec::new())
    .await
    .unwrap_err();

    assert!(matches!(err, RenameError::TemplateRender { .. }));
    assert!(mover.calls.lock().unwrap().is_empty());
}

// ── Observer ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn observer_sees_stages_in_order() {
    let doc = StubDocument::new(3);
    let extractor = StubExtractor::new(r#"{"Title": "Invoice"}"#);
    let template = FilenameTemplate::compile("{{.Title}}.pdf").unwrap();
    let log = EventLog::default();

    Pipeline {
        document: &doc,
        transcriber: &StubTranscriber::default(),
        extractor: &extractor,
        template: &template,
        mover: &RecordingMover::default(),
        page_range: range(0, 1),
        dry_run: true,
        observer: &log,
    }
    .run(Path::new(SOURCE), &mut Vec::new())
    .await
    .unwrap();

    assert_eq!(
        *log.events.lock().unwrap(),
        vec![
            "open 3 0-1",
            "page 0",
            "done 0 1",
            "page 1",
            "done 1 1",
            "extract 4",
            "name Invoice.pdf",
        ]
    );
}
