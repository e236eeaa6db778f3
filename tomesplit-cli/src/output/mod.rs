//! Output formatting module

use crate::error::CliError;
use crate::input::{Chapter, ExtractedBook, SourceFormat};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tomesplit_core::{Part, SubUnit};

pub mod epub;
pub mod manifest;
pub mod markdown;

pub use self::epub::EpubWriter;
pub use manifest::Manifest;
pub use markdown::MarkdownWriter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One markdown file per part
    Markdown,
    /// One EPUB package per part (EPUB sources only)
    Epub,
    /// Not supported as an output; rejected with an error
    Pdf,
}

impl OutputFormat {
    /// Lowercase name used in messages
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Epub => "epub",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for part writers
pub trait PartWriter: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Render one part of `book` to file contents
    fn render(&self, book: &ExtractedBook, part: &Part) -> Result<Vec<u8>>;
}

/// Create the writer for a source/output pair
pub fn writer_for(source: SourceFormat, format: OutputFormat) -> Result<Box<dyn PartWriter>> {
    match (source, format) {
        (_, OutputFormat::Markdown) => Ok(Box::new(MarkdownWriter)),
        (SourceFormat::Epub, OutputFormat::Epub) => Ok(Box::new(EpubWriter)),
        (source, format) => Err(CliError::UnsupportedConversion {
            from: source.name().to_string(),
            to: format.name().to_string(),
        }
        .into()),
    }
}

/// `{stem}_part{N}.{extension}`
pub fn part_file_name(stem: &str, sequence_number: usize, extension: &str) -> String {
    format!("{stem}_part{sequence_number}.{extension}")
}

/// Output path of one part
pub fn part_path(dir: &Path, stem: &str, sequence_number: usize, extension: &str) -> PathBuf {
    dir.join(part_file_name(stem, sequence_number, extension))
}

/// A chapter, or one slice of it, as placed in a part
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Position of the chapter in the book
    pub index: usize,
    /// The chapter itself
    pub chapter: &'a Chapter,
    /// Slice, when only part of the chapter is in this part
    pub slice: Option<&'a SubUnit>,
    /// Text of the chapter or slice
    pub text: &'a str,
}

impl Entry<'_> {
    /// Whether this entry continues a chapter started in an earlier slice
    pub fn is_continuation(&self) -> bool {
        self.slice.is_some_and(|s| s.ordinal > 0)
    }

    /// Heading shown for the entry
    pub fn heading(&self) -> String {
        if self.is_continuation() {
            format!("{} (continued)", self.chapter.title)
        } else {
            self.chapter.title.clone()
        }
    }
}

/// Resolve the unit references of `part` against the chapters of `book`
pub fn entries<'a>(book: &'a ExtractedBook, part: &'a Part) -> Result<Vec<Entry<'a>>> {
    part.units
        .iter()
        .map(|unit| {
            let index = unit.unit_index();
            let chapter = book
                .chapters
                .get(index)
                .ok_or_else(|| anyhow!("Part {} references unknown unit {index}", part.sequence_number))?;

            let slice = unit.sub_unit();
            let text = match slice {
                Some(sub) => sub.slice(&chapter.text).ok_or_else(|| {
                    anyhow!("Slice {}..{} is outside unit {index}", sub.start, sub.end())
                })?,
                None => chapter.text.as_str(),
            };

            Ok(Entry {
                index,
                chapter,
                slice,
                text,
            })
        })
        .collect()
}
