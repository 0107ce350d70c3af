//! Document generation: DOCX templating and PDF conversion.
//!
//! - `xml` - owned XML tree used to edit `word/document.xml`
//! - `docx` - opening and saving DOCX packages
//! - `filler` - `{Field}` placeholder substitution
//! - `converter` - DOCX to PDF through an external tool

pub mod converter;
pub mod docx;
pub mod filler;
pub mod xml;

pub use converter::{pdf_path_for, ConversionError, DocumentConverter, LibreOfficeConverter};
pub use docx::DocxDocument;
pub use filler::{fill_document, substitute};

use thiserror::Error;

/// Errors raised while loading, filling or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("malformed document XML: {0}")]
    Xml(String),
    #[error("document part {0} is missing")]
    MissingPart(String),
}

/// Load the template at `path` and fill it from `record`.
pub fn render_template(
    path: &std::path::Path,
    record: &crate::payroll::Record,
) -> Result<DocxDocument, DocumentError> {
    let mut document = DocxDocument::open(path)?;
    fill_document(&mut document, record);
    Ok(document)
}
