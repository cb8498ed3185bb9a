//! Pipeline stages for renaming a PDF from its own content.
//!
//! Each submodule implements one step. The orchestration lives in
//! [`crate::rename`]; the stages here know nothing about each other beyond
//! the types they hand along.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm ──▶ transcript ──▶ llm ──▶ extract ──▶ template ──▶ finish
//! (path)   (pdfium)   (base64)   (VLM)   (join pages)  (JSON)   (fields)    (tera)     (print/mv)
//! ```
//!
//! 1. [`input`]      check the path is a readable PDF file
//! 2. [`render`]     rasterise one page at a time behind the [`render::PageSource`] seam
//! 3. [`encode`]     JPEG-encode and base64-wrap the bitmap
//! 4. [`llm`]        chat-completion calls: page transcription and field extraction
//! 5. [`transcript`] collect page markdown and join it into one document
//! 6. [`extract`]    decode the extraction payload into string fields
//! 7. [`template`]   render the filename format, with [`helpers`] as filters
//! 8. [`finish`]     print the name (dry run) or move the file next to itself

pub mod encode;
pub mod extract;
pub mod finish;
pub mod helpers;
pub mod input;
pub mod llm;
pub mod render;
pub mod template;
pub mod transcript;
