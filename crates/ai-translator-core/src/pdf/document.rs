use std::path::Path;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object};
use tracing::warn;

use crate::error::{Error, Result};

/// Text of a parsed PDF, one entry per page.
///
/// Text is extracted once on load, so the document is cheap to clone and
/// share across tasks.
#[derive(Clone)]
pub struct PdfDocument {
    /// Extracted text per page, or the extraction failure
    pages: Arc<Vec<std::result::Result<String, String>>>,
    title: Option<String>,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| Error::PdfOpen(format!("Failed to parse PDF: {e}")))?;

        // get_pages() is keyed by 1-based page number, in document order
        let pages = doc
            .get_pages()
            .keys()
            .map(|&number| {
                doc.extract_text(&[number]).map_err(|e| {
                    warn!("Failed to extract text from page {}: {}", number, e);
                    e.to_string()
                })
            })
            .collect();

        Ok(Self {
            pages: Arc::new(pages),
            title: read_title(&doc),
        })
    }

    /// Open a PDF from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            Error::PdfOpen(format!("Failed to read file {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Build a document from already-extracted page texts
    pub fn from_page_texts(pages: Vec<String>, title: Option<String>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(Ok).collect()),
            title,
        }
    }

    /// Get number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Document title from the info dictionary, if any
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Text of one page (0-indexed).
    pub fn page_text(&self, page_num: usize) -> Result<String> {
        let page = self.pages.get(page_num).ok_or(Error::PdfInvalidPage {
            page: page_num,
            total: self.page_count(),
        })?;

        page.clone().map_err(|reason| Error::PdfTextExtraction {
            page: page_num,
            reason,
        })
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count())
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

fn read_title(doc: &Document) -> Option<String> {
    let info: &Dictionary = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    match info.get(b"Title").ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
    .filter(|title| !title.trim().is_empty())
}

/// PDF text strings are UTF-16BE or (PDF 2.0) UTF-8 with a BOM, otherwise a single-byte encoding.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
