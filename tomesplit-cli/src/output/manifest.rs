//! JSON manifest describing a split

use crate::input::ExtractedBook;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tomesplit_core::{SegmentConfig, SegmentWarning, Segmentation, UnitRef};

/// Summary of one split, written as `{stem}_manifest.json`
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    /// Source file
    pub source: String,
    /// Source format name
    pub source_format: &'static str,
    /// Output format name
    pub output_format: &'static str,
    /// Book title
    pub title: &'a str,
    /// Word budget used
    pub max_words: usize,
    /// Boundary strictness used
    pub strict_boundaries: bool,
    /// Words across the whole book
    pub total_words: usize,
    /// Parts in order
    pub parts: Vec<ManifestPart<'a>>,
    /// Oversized units that were kept whole
    pub warnings: &'a [SegmentWarning],
}

/// One part as listed in the manifest
#[derive(Debug, Serialize)]
pub struct ManifestPart<'a> {
    /// 1-based part number
    pub sequence_number: usize,
    /// Output file name
    pub file: String,
    /// Words in the part
    pub total_words: usize,
    /// Identifiers of the units touched, in order
    pub identifiers: Vec<&'a str>,
    /// Whole and partial unit references
    pub units: &'a [UnitRef],
}

impl<'a> Manifest<'a> {
    /// Describe `segmentation` of `book`; `files` are the part file names in order
    pub fn new(
        source: &Path,
        book: &'a ExtractedBook,
        output_format: &'static str,
        config: &SegmentConfig,
        segmentation: &'a Segmentation,
        files: &[String],
    ) -> Self {
        let parts = segmentation
            .parts
            .iter()
            .zip(files)
            .map(|(part, file)| {
                let mut identifiers: Vec<&str> = Vec::new();
                for chapter in part.units.iter().filter_map(|u| book.chapters.get(u.unit_index())) {
                    let id = chapter.identifier.as_str();
                    if identifiers.last() != Some(&id) {
                        identifiers.push(id);
                    }
                }
                ManifestPart {
                    sequence_number: part.sequence_number,
                    file: file.clone(),
                    total_words: part.total_words,
                    identifiers,
                    units: &part.units,
                }
            })
            .collect();

        Self {
            source: source.display().to_string(),
            source_format: book.format.name(),
            output_format,
            title: &book.metadata.title,
            max_words: config.max_words,
            strict_boundaries: config.strict_boundaries,
            total_words: book.total_words(),
            parts,
            warnings: &segmentation.warnings,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize manifest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::pdf_book;
    use tomesplit_core::segment;

    #[test]
    fn test_manifest_json() {
        let book = pdf_book(&["one two three", "four five", "six seven eight nine ten"]);
        let config = SegmentConfig::new(4).unwrap();
        let segmentation = segment(&book.units(), &config).unwrap();
        let files: Vec<String> = (1..=segmentation.len())
            .map(|n| format!("scan_part{n}.md"))
            .collect();

        let manifest = Manifest::new(
            Path::new("scan.pdf"),
            &book,
            "markdown",
            &config,
            &segmentation,
            &files,
        );
        let value: serde_json::Value = serde_json::from_str(&manifest.to_json(true).unwrap()).unwrap();

        assert_eq!(value["source_format"], "pdf");
        assert_eq!(value["max_words"], 4);
        assert_eq!(value["total_words"], 10);
        assert_eq!(value["parts"][0]["file"], "scan_part1.md");
        assert_eq!(value["parts"][0]["identifiers"][0], "page1");
        assert_eq!(value["parts"][0]["units"][0]["kind"], "whole");

        let last = segmentation.len() - 1;
        assert_eq!(value["parts"][last]["identifiers"], serde_json::json!(["page3"]));
        assert_eq!(value["parts"][last]["units"][0]["kind"], "partial");
        assert_eq!(value["parts"][last]["units"][0]["granularity"], "token");
        assert!(value["warnings"].as_array().unwrap().is_empty());
    }
}
