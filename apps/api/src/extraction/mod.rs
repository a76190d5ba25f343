//! PDF text extraction.
//!
//! Pages are read in document order and their text concatenated with no
//! separator. Any failure inside the PDF library, panics included, is turned
//! into an [`ExtractionFailure`]; nothing escapes this module.

use std::panic;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("{0}")]
    Unreadable(String),

    #[error("the document contains no extractable text")]
    NoText,
}

impl ExtractionFailure {
    /// Message shown to the uploader.
    pub fn user_message(&self) -> String {
        format!("PDF reading error: {self}")
    }
}

/// Text of a whole document plus how many pages it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Yields the text of each page of a PDF, in document order.
pub trait PageSource: Send + Sync {
    fn pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionFailure>;
}

/// `pdf-extract` backed page source used in production.
pub struct PdfExtractPages;

impl PageSource for PdfExtractPages {
    fn pages(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractionFailure> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf)) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ExtractionFailure::Unreadable(e.to_string())),
            Err(_) => Err(ExtractionFailure::Unreadable(
                "the document structure could not be parsed".to_string(),
            )),
        }
    }
}

/// Extracts all text from a PDF through the given page source.
pub fn extract_with(
    source: &dyn PageSource,
    pdf: &[u8],
) -> Result<ExtractedText, ExtractionFailure> {
    let pages = source.pages(pdf)?;
    let page_count = pages.len();
    let text = pages.concat();

    if text.trim().is_empty() {
        return Err(ExtractionFailure::NoText);
    }

    Ok(ExtractedText { text, page_count })
}
