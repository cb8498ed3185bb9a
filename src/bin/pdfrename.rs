//! CLI binary for edgequake-pdfrename.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RenameConfig` and reports the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfrename::config::{DEFAULT_ENDPOINT, DEFAULT_FORMAT, DEFAULT_MODEL};
use edgequake_pdfrename::{
    rename_with_output, PageRange, PageRangeMode, RenameConfig, RenameObserver,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal spinner on stderr that follows the page loop.
struct CliProgressObserver {
    bar: ProgressBar,
}

impl CliProgressObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Remove the spinner. Safe to call after it already finished.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl RenameObserver for CliProgressObserver {
    fn on_document_open(&self, page_count: usize, start: usize, end: usize) {
        self.bar.set_prefix("Reading");
        self.bar
            .set_message(format!("{page_count} pages, transcribing {start}-{end}"));
    }

    fn on_page_start(&self, page: usize) {
        self.bar.set_message(format!("page {page}"));
    }

    fn on_page_complete(&self, page: usize, markdown_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            green("✓"),
            page,
            dim(&format!("{markdown_len:>5} chars")),
        ));
    }

    fn on_extraction_start(&self, markdown_len: usize) {
        self.bar.set_prefix("Extracting");
        self.bar
            .set_message(format!("fields from {markdown_len} chars of markdown"));
    }

    fn on_filename(&self, filename: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✔"), bold(filename));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview the new name without touching the file
  pdfrename --dry-run scan0042.pdf

  # Company and date, snake_case, from the first two pages
  pdfrename --page-range-mode inclusive --page-range 0-1 \
    --format '{{.Company | snakecase}}-{{.Date}}.pdf' \
    --prompt 'Date as YYYY-MM-DD' scan0042.pdf

  # Local OpenAI-compatible server (Ollama, vLLM, LiteLLM, ...)
  pdfrename --endpoint http://localhost:11434/v1 \
    --image-model llava --text-model llama3.1 scan0042.pdf

  # Machine-readable result
  pdfrename --dry-run --json scan0042.pdf

FORMAT HELPERS:
  snakecase kebabcase camelcase swapcase untitle initials nospace filesafe
  plus tera built-ins: upper lower title trim replace slugify truncate ...

PAGE RANGES:
  Pages are 0-based. In the default `compat` mode a single number always
  selects page 0 and `N-M` selects page N only. Use
  `--page-range-mode inclusive` for `N` = page N and `N-M` = pages N..=M.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          Bearer credential for --endpoint
  OPENAI_BASE_URL         OpenAI-compatible base URL
  PDFIUM_LIB_PATH         Directory (or file) holding libpdfium
  RUST_LOG                Overrides -v / -q log filtering
"#;

/// Rename PDF files from their content using vision and text LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfrename",
    version,
    about = "Rename PDF files from their content using vision and text LLMs",
    long_about = "Render PDF pages to images, transcribe them to markdown with a vision model, \
extract the fields a filename template needs with a text model, then rename the file (or print \
the new name with --dry-run). Works with any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to rename.
    input: PathBuf,

    /// Pages to transcribe (0-based), e.g. 0 or 0-1. See --page-range-mode.
    #[arg(long, env = "PDFRENAME_PAGE_RANGE", default_value = "1")]
    page_range: String,

    /// How --page-range is interpreted.
    #[arg(long, value_enum, default_value = "compat")]
    page_range_mode: RangeModeArg,

    /// OpenAI-compatible base URL.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// API key sent as a bearer token.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Vision model used to transcribe pages.
    #[arg(long, env = "PDFRENAME_IMAGE_MODEL", default_value = DEFAULT_MODEL)]
    image_model: String,

    /// Text model used to extract filename fields.
    #[arg(long, env = "PDFRENAME_TEXT_MODEL", default_value = DEFAULT_MODEL)]
    text_model: String,

    /// Filename template, e.g. '{{.Company | snakecase}}-{{.Date}}.pdf'.
    #[arg(long, env = "PDFRENAME_FORMAT", default_value = DEFAULT_FORMAT)]
    format: String,

    /// Extra guidance for field extraction, e.g. 'Date as YYYY-MM-DD'.
    #[arg(long, env = "PDFRENAME_PROMPT", default_value = "")]
    prompt: String,

    /// Print the new filename instead of renaming.
    #[arg(long)]
    dry_run: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFRENAME_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Longest edge of a rendered page in pixels.
    #[arg(long, env = "PDFRENAME_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Per-request LLM timeout in seconds. Waits indefinitely when unset.
    #[arg(long, env = "PDFRENAME_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Directory (or file) containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Print the full outcome as JSON instead of the bare filename.
    #[arg(long)]
    json: bool,

    /// Show a progress spinner on stderr.
    #[arg(long)]
    progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFRENAME_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "PDFRENAME_QUIET")]
    quiet: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RangeModeArg {
    Compat,
    Inclusive,
}

impl From<RangeModeArg> for PageRangeMode {
    fn from(v: RangeModeArg) -> Self {
        match v {
            RangeModeArg::Compat => PageRangeMode::Compat,
            RangeModeArg::Inclusive => PageRangeMode::Inclusive,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level progress logs.
    let show_progress = cli.progress && !cli.quiet;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressObserver::new);
    run_with_progress(&cli, progress).await
}

/// Run once, removing the spinner whether the run succeeds or fails.
async fn run_with_progress(cli: &Cli, progress: Option<Arc<CliProgressObserver>>) -> Result<()> {
    let result = run(cli, progress.clone()).await;
    if let Some(observer) = progress {
        observer.clear();
    }
    result
}

async fn run(cli: &Cli, progress: Option<Arc<CliProgressObserver>>) -> Result<()> {
    let config = build_config(cli, progress)?;

    if cli.json {
        let outcome = rename_with_output(&cli.input, &config, &mut io::sink())
            .await
            .context("Rename failed")?;
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?;
        println!("{json}");
    } else {
        let outcome = rename_with_output(&cli.input, &config, &mut io::stdout())
            .await
            .context("Rename failed")?;
        if outcome.renamed() && !cli.quiet {
            eprintln!(
                "{} → {}",
                outcome.source.display(),
                bold(&outcome.target.display().to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `RenameConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressObserver>>) -> Result<RenameConfig> {
    let page_range = PageRange::parse(&cli.page_range, cli.page_range_mode.into())
        .context("Invalid --page-range")?;

    let mut builder = RenameConfig::builder()
        .endpoint(&cli.endpoint)
        .image_model(&cli.image_model)
        .text_model(&cli.text_model)
        .format(&cli.format)
        .prompt(&cli.prompt)
        .dry_run(cli.dry_run)
        .page_range(page_range)
        .max_rendered_pixels(cli.max_pixels);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(observer) = progress {
        builder = builder.observer(observer);
    }

    builder.build().context("Invalid configuration")
}
