//! Input handling: file resolution and unit extraction

use crate::config::ExtractionConfig;
use crate::error::CliError;
use anyhow::Result;
use std::fmt;
use std::path::Path;
use tomesplit_core::StructuralUnit;

pub mod epub;
pub mod glob_resolver;
pub mod pdf;
pub mod sections;

pub use self::epub::EpubExtractor;
pub use self::pdf::PdfExtractor;
pub use glob_resolver::resolve_patterns;

/// Readable source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// EPUB 2/3 package
    Epub,
    /// PDF with a text layer
    Pdf,
}

impl SourceFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("epub") => Ok(SourceFormat::Epub),
            Some("pdf") => Ok(SourceFormat::Pdf),
            _ => Err(CliError::UnsupportedFormat(path.display().to_string()).into()),
        }
    }

    /// Lowercase name used in messages and manifests
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Epub => "epub",
            SourceFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Book-level metadata carried into every part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    /// Title, falling back to the file stem
    pub title: String,
    /// First creator, if any
    pub creator: Option<String>,
    /// Language code, if any
    pub language: Option<String>,
    /// Unique identifier, if any
    pub identifier: Option<String>,
    /// `dcterms:modified` timestamp of the source package, if any
    pub modified: Option<String>,
}

/// One structural unit of the source: an EPUB spine document or a PDF page
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Spine id for EPUB, `page{N}` for PDF
    pub identifier: String,
    /// Display title
    pub title: String,
    /// Plain text used for counting, splitting and markdown output
    pub text: String,
    /// Words in `text`
    pub word_count: usize,
    /// Whether a part may start at this chapter
    pub is_boundary: bool,
    /// 1-based page number for PDF pages
    pub page_number: Option<usize>,
    /// Original document for EPUB spine items
    pub document: Option<Document>,
}

/// Raw spine document kept for the EPUB writer
#[derive(Debug, Clone)]
pub struct Document {
    /// Path inside the source archive
    pub path: String,
    /// Media type from the source manifest
    pub media_type: String,
    /// Unmodified bytes
    pub data: Vec<u8>,
}

/// Non-document resource of an EPUB (image, stylesheet, font)
#[derive(Debug, Clone)]
pub struct Resource {
    /// Manifest id in the source package
    pub id: String,
    /// Path inside the source archive
    pub path: String,
    /// Media type from the source manifest
    pub media_type: String,
    /// File contents
    pub data: Vec<u8>,
}

/// Everything extraction learned about a book
#[derive(Debug, Clone)]
pub struct ExtractedBook {
    /// Format the book was read from
    pub format: SourceFormat,
    /// File stem used to name output files
    pub stem: String,
    /// Book metadata
    pub metadata: BookMetadata,
    /// Units in reading order
    pub chapters: Vec<Chapter>,
    /// Non-document resources (EPUB only)
    pub resources: Vec<Resource>,
    /// Directory of the package document inside the archive, with trailing slash
    pub package_dir: String,
}

impl ExtractedBook {
    /// Total words across all chapters
    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(|c| c.word_count).sum()
    }

    /// Build the engine input, one unit per chapter
    pub fn units(&self) -> Vec<StructuralUnit> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| StructuralUnit {
                index,
                identifier: chapter.identifier.clone(),
                word_count: chapter.word_count,
                is_boundary: chapter.is_boundary,
                text: Some(chapter.text.clone()),
            })
            .collect()
    }
}

/// A source reader producing an [`ExtractedBook`]
pub trait Extractor: Send + Sync {
    /// Format handled by this extractor
    fn format(&self) -> SourceFormat;

    /// Read the file at `path`
    fn extract(&self, path: &Path) -> Result<ExtractedBook>;
}

/// Create the extractor for `format`
pub fn extractor_for(format: SourceFormat, config: &ExtractionConfig) -> Box<dyn Extractor> {
    match format {
        SourceFormat::Epub => Box::new(EpubExtractor::new(config.text_width)),
        SourceFormat::Pdf => Box::new(PdfExtractor::new(config.detect_sections)),
    }
}

/// File stem of `path`, or `"book"` when it has none
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "book".to_string())
}
