//! PDF extraction backed by `pdf-extract`
//!
//! `pdf-extract` returns the whole text layer as one string with a form feed
//! between pages. Each page becomes one chapter; section detection decides
//! which pages may start a part.

use super::{file_stem, sections, BookMetadata, Chapter, ExtractedBook, Extractor, SourceFormat};
use crate::error::CliError;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tomesplit_core::count_words;

const PAGE_BREAK: char = '\x0C';

/// Reads PDF text layers page by page
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    detect_sections: bool,
}

impl PdfExtractor {
    /// Create an extractor; without section detection every page is a boundary
    pub fn new(detect_sections: bool) -> Self {
        Self { detect_sections }
    }

    /// Turn the raw text layer into page chapters
    pub fn pages_from_text(&self, text: &str) -> Vec<Chapter> {
        let mut raw_pages: Vec<String> = text.split(PAGE_BREAK).map(str::to_string).collect();
        if raw_pages.len() > 1 && raw_pages.last().is_some_and(|p| p.trim().is_empty()) {
            raw_pages.pop();
        }

        let boundaries = if self.detect_sections {
            sections::detect_boundaries(&raw_pages)
        } else {
            vec![true; raw_pages.len()]
        };

        raw_pages
            .par_iter()
            .zip(boundaries.par_iter())
            .enumerate()
            .map(|(position, (raw, &is_boundary))| {
                let page_number = position + 1;
                let text = sections::clean_page_text(raw);
                let word_count = count_words(&text);
                Chapter {
                    identifier: format!("page{page_number}"),
                    title: format!("Page {page_number}"),
                    text,
                    word_count,
                    is_boundary,
                    page_number: Some(page_number),
                    document: None,
                }
            })
            .collect()
    }
}

impl Extractor for PdfExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Pdf
    }

    fn extract(&self, path: &Path) -> Result<ExtractedBook> {
        log::info!("Extracting text from {}", path.display());

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            anyhow::anyhow!("Failed to extract text from PDF {}: {e}", path.display())
        })?;

        if text.trim().is_empty() {
            return Err(CliError::EmptyDocument(path.display().to_string()).into());
        }

        let chapters = self.pages_from_text(&text);
        let stem = file_stem(path);
        let book = ExtractedBook {
            format: SourceFormat::Pdf,
            metadata: BookMetadata {
                title: stem.clone(),
                ..Default::default()
            },
            stem,
            chapters,
            resources: Vec::new(),
            package_dir: String::new(),
        };

        log::info!(
            "Extracted {} pages with a total of {} words",
            book.chapters.len(),
            book.total_words()
        );
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let text = "Chapter 1\nFirst page words here.\x0Cstill the first chapter going on\x0CChapter 2\nSecond chapter.\x0C";
        let pages = PdfExtractor::new(true).pages_from_text(text);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].identifier, "page1");
        assert_eq!(pages[2].title, "Page 3");
        assert_eq!(pages[2].page_number, Some(3));
        let boundaries: Vec<bool> = pages.iter().map(|p| p.is_boundary).collect();
        assert_eq!(boundaries, vec![true, false, true]);
        assert_eq!(pages[1].word_count, 6);
    }

    #[test]
    fn test_detection_disabled_marks_every_page() {
        let text = "Chapter 1\nwords\x0Cmore words without heading at all here";
        let pages = PdfExtractor::new(false).pages_from_text(text);
        assert!(pages.iter().all(|p| p.is_boundary));
    }

    #[test]
    fn test_single_page_without_form_feed() {
        let pages = PdfExtractor::new(true).pages_from_text("just one page of text");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].word_count, 5);
    }

    #[test]
    fn test_page_text_is_cleaned_before_counting() {
        let pages = PdfExtractor::new(true).pages_from_text("hyphen-\nated words\n\n\n\nend");
        assert_eq!(pages[0].text, "hyphenated words\n\nend");
        assert_eq!(pages[0].word_count, 3);
    }

    #[test]
    fn test_extract_missing_file() {
        let result = PdfExtractor::new(true).extract(Path::new("/nonexistent/scan.pdf"));
        assert!(result.unwrap_err().to_string().contains("Failed to read file"));
    }
}
