//! Markdown part writer

use super::{entries, Entry, PartWriter};
use crate::input::{ExtractedBook, SourceFormat};
use anyhow::Result;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;
use tomesplit_core::Part;

static ANCHOR_STRIP: OnceLock<Regex> = OnceLock::new();
static ANCHOR_SEPARATORS: OnceLock<Regex> = OnceLock::new();

/// Markdown writer - one heading per chapter or page, separated by rules
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownWriter;

impl PartWriter for MarkdownWriter {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, book: &ExtractedBook, part: &Part) -> Result<Vec<u8>> {
        let entries = entries(book, part)?;
        let mut out = String::new();

        writeln!(out, "# {} - Part {}\n", book.metadata.title, part.sequence_number)?;

        if let Some((first, last)) = page_range(&entries) {
            writeln!(out, "*Pages: {first}-{last}*\n")?;
        }
        writeln!(out, "*Words: {}*\n", part.total_words)?;

        if book.format == SourceFormat::Epub {
            writeln!(out, "## Table of Contents\n")?;
            for (position, entry) in entries.iter().enumerate() {
                let heading = entry.heading();
                writeln!(out, "{}. [{}](#{})", position + 1, heading, anchor(&heading))?;
            }
            writeln!(out)?;
        }

        for entry in &entries {
            writeln!(out, "## {}\n", entry.heading())?;
            writeln!(out, "{}\n", entry.text.trim())?;
            writeln!(out, "---\n")?;
        }

        Ok(out.into_bytes())
    }
}

fn page_range(entries: &[Entry<'_>]) -> Option<(usize, usize)> {
    let first = entries.first()?.chapter.page_number?;
    let last = entries.last()?.chapter.page_number?;
    Some((first, last))
}

/// Anchor slug for a heading: lowercase, punctuation dropped, runs of
/// whitespace and hyphens joined by a single hyphen
pub fn anchor(text: &str) -> String {
    let strip = ANCHOR_STRIP
        .get_or_init(|| Regex::new(r"[^\w\s-]").expect("anchor pattern is a valid regex"));
    let separators = ANCHOR_SEPARATORS
        .get_or_init(|| Regex::new(r"[\s-]+").expect("separator pattern is a valid regex"));

    let lowered = text.to_lowercase();
    let stripped = strip.replace_all(&lowered, "");
    separators.replace_all(&stripped, "-").into_owned()
}
