//! # edgequake-pdfrename
//!
//! Rename PDF documents from their own content.
//!
//! Scanned invoices, statements and letters arrive as `scan0042.pdf`. This
//! crate reads the first page(s) the way a person would, through a vision
//! model, asks a text model for the handful of fields the filename needs and
//! renders them into a template such as `{{.Company | snakecase}}-{{.Date}}.pdf`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      check the file is a readable PDF
//!  ├─ 2. Render     rasterise each selected page via pdfium
//!  ├─ 3. Encode     JPEG → base64 data URL
//!  ├─ 4. Transcribe vision model turns each page into markdown
//!  ├─ 5. Extract    text model returns the template's fields as JSON
//!  ├─ 6. Template   render the filename
//!  └─ 7. Finish     print it (dry run) or rename the file in place
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfrename::{rename, RenameConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenameConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .format("{{.Company | snakecase}}-{{.Date}}.pdf")
//!         .prompt("Date as YYYY-MM-DD")
//!         .dry_run(true)
//!         .build()?;
//!     let outcome = rename("scan0042.pdf", &config).await?;
//!     eprintln!("{} → {}", outcome.source.display(), outcome.filename);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfrename` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdfrename = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rename;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageRange, PageRangeMode, RenameConfig, RenameConfigBuilder};
pub use error::{LlmError, RenameError};
pub use output::{RenameAction, RenameOutcome};
pub use pipeline::extract::ExtractedFields;
pub use pipeline::template::FilenameTemplate;
pub use progress::{NoopObserver, ObserverHandle, RenameObserver};
pub use rename::{rename, rename_sync, rename_with_output, Pipeline};
