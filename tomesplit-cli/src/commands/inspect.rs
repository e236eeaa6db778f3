//! Inspect command implementation

use super::init_logging;
use super::split::plan_lines;
use crate::config::CliConfig;
use crate::input::{extractor_for, ExtractedBook, SourceFormat};
use anyhow::{Context, Result};
use clap::Args;
use std::fmt::Write;
use std::path::PathBuf;
use tomesplit_core::{segment, SegmentConfig, Segmentation};

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Book to inspect
    #[arg(short, long, value_name = "FILE", required = true)]
    pub input: PathBuf,

    /// Maximum words per output file used for the plan
    #[arg(short = 'w', long, value_name = "N")]
    pub max_words: Option<usize>,

    /// Plan with strict boundaries
    #[arg(short, long, visible_alias = "strict-chapters")]
    pub strict_boundaries: bool,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> Result<()> {
        init_logging(false, self.verbose);

        let mut config = CliConfig::load(self.config.as_deref())?;
        if let Some(max_words) = self.max_words {
            config.segmentation.max_words = max_words;
        }
        if self.strict_boundaries {
            config.segmentation.strict_boundaries = true;
        }
        let segment_config = config.segment_config()?;

        if !self.input.is_file() {
            return Err(
                crate::error::CliError::FileNotFound(self.input.display().to_string()).into(),
            );
        }

        let source = SourceFormat::from_path(&self.input)?;
        let book = extractor_for(source, &config.extraction).extract(&self.input)?;
        let segmentation = segment(&book.units(), &segment_config)
            .with_context(|| format!("Failed to segment {}", self.input.display()))?;

        print!("{}", report(&book, &segment_config, &segmentation)?);
        Ok(())
    }
}

fn report(book: &ExtractedBook, config: &SegmentConfig, segmentation: &Segmentation) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "Title:  {}", book.metadata.title)?;
    if let Some(creator) = &book.metadata.creator {
        writeln!(out, "Author: {creator}")?;
    }
    writeln!(out, "Format: {}", book.format)?;
    writeln!(
        out,
        "Units:  {} ({} words)",
        book.chapters.len(),
        book.total_words()
    )?;
    writeln!(out)?;

    writeln!(out, "{:>5}  {:<24} {:>8} {:>9}  Title", "#", "Identifier", "Boundary", "Words")?;
    for (position, chapter) in book.chapters.iter().enumerate() {
        writeln!(
            out,
            "{:>5}  {:<24} {:>8} {:>9}  {}",
            position + 1,
            chapter.identifier,
            if chapter.is_boundary { "yes" } else { "no" },
            chapter.word_count,
            chapter.title
        )?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Plan (max {} words{}):",
        config.max_words,
        if config.strict_boundaries { ", strict boundaries" } else { "" }
    )?;
    for line in plan_lines(book, segmentation) {
        writeln!(out, "  {line}")?;
    }
    for warning in &segmentation.warnings {
        writeln!(out, "  warning: {warning}")?;
    }

    Ok(out)
}
