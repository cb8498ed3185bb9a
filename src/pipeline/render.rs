//! PDF rasterisation behind the [`PageSource`] seam.
//!
//! The rename loop only needs two things from a document: how many pages it
//! has and a bitmap for a given page. [`PdfiumDocument`] provides them via
//! pdfium; tests substitute canned bitmaps.
//!
//! ## Handle lifetime
//!
//! A `PdfiumDocument` borrows the bound [`Pdfium`] instance and owns the open
//! document. It is created once per run in [`crate::rename::rename`] and
//! closed by `Drop` when that scope ends, on the success path and on every
//! early `?` return alike.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 150 DPI would produce a
//! 12,000 × 17,000 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded and the JPEG payload
//! inside typical request limits.

use crate::error::RenameError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A document the page loop can rasterise.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based) to a bitmap.
    fn render_page(&self, index: usize) -> Result<DynamicImage, RenameError>;
}

/// Bind to a pdfium shared library.
///
/// `lib_path` may name the library file itself or a directory containing the
/// platform-specific file (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
/// With `None` the system library search path is used.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, RenameError> {
    let bindings = match lib_path {
        Some(dir) if dir.is_dir() => {
            let lib = Pdfium::pdfium_platform_library_name_at_path(dir);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        Some(file) => {
            debug!("Binding pdfium from {}", file.display());
            Pdfium::bind_to_library(file)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| RenameError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// An open PDF document rendered through pdfium.
pub struct PdfiumDocument<'a> {
    path: PathBuf,
    document: PdfDocument<'a>,
    render_config: PdfRenderConfig,
}

impl<'a> PdfiumDocument<'a> {
    /// Open `path`, mapping pdfium's load errors onto [`RenameError`].
    ///
    /// pdfium ties the loaded document to the password, so it must live as
    /// long as the binding.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
        max_pixels: u32,
    ) -> Result<Self, RenameError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    RenameError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    RenameError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                RenameError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!(path = %path.display(), pages = document.pages().len(), "pdf.loaded");

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        Ok(Self {
            path: path.to_path_buf(),
            document,
            render_config,
        })
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, RenameError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| RenameError::RasterisationFailed {
                page: index,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&self.render_config).map_err(|e| {
            RenameError::RasterisationFailed {
                page: index,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}

impl Drop for PdfiumDocument<'_> {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "pdf.close");
    }
}
