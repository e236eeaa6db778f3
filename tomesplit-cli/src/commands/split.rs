//! Split command implementation

use super::init_logging;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{extractor_for, file_stem, resolve_patterns, ExtractedBook, SourceFormat};
use crate::output::{part_file_name, part_path, writer_for, Manifest, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tomesplit_core::{segment, SegmentConfig, Segmentation};

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Directory for output files (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output format (default: markdown)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum words per output file (default: 80000)
    #[arg(short = 'w', long, value_name = "N")]
    pub max_words: Option<usize>,

    /// Only split at chapter or section boundaries, even past the word limit
    #[arg(short, long, visible_alias = "strict-chapters")]
    pub strict_boundaries: bool,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write a JSON manifest of the parts
    #[arg(long)]
    pub manifest: bool,

    /// Print the plan without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Number of worker threads (default: all cores)
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SplitArgs {
    /// Execute the split command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.quiet, self.verbose);

        log::info!("Starting split");
        log::debug!("Arguments: {:?}", self);

        let config = self.effective_config()?;
        let segment_config = config.segment_config()?;
        let files = resolve_patterns(&self.input)?;

        if !self.dry_run {
            check_distinct_stems(&files)?;
            fs::create_dir_all(&config.output.directory).with_context(|| {
                format!(
                    "Cannot create output directory: {}",
                    config.output.directory.display()
                )
            })?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.extraction.threads())
            .build()
            .context("Failed to build worker pool")?;

        let mut created = Vec::new();
        for path in &files {
            let outputs = pool.install(|| self.split_book(path, &config, &segment_config))?;
            created.extend(outputs);
        }

        if !self.dry_run {
            print!("{}", completion_summary(&created));
        }

        Ok(())
    }

    /// Merge the configuration file with command-line overrides
    pub fn effective_config(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;

        if let Some(max_words) = self.max_words {
            config.segmentation.max_words = max_words;
        }
        if self.strict_boundaries {
            config.segmentation.strict_boundaries = true;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(dir) = &self.output {
            config.output.directory = dir.clone();
        }
        if self.manifest {
            config.output.manifest = true;
        }
        if let Some(threads) = self.threads {
            config.extraction.worker_threads = threads;
        }

        config.validate()?;
        Ok(config)
    }

    fn split_book(
        &self,
        path: &Path,
        config: &CliConfig,
        segment_config: &SegmentConfig,
    ) -> Result<Vec<PathBuf>> {
        let source = SourceFormat::from_path(path)?;
        let writer = writer_for(source, config.output.format)?;
        let book = extractor_for(source, &config.extraction).extract(path)?;

        let segmentation = segment(&book.units(), segment_config)
            .with_context(|| format!("Failed to segment {}", path.display()))?;

        log::info!("Determined {} parts", segmentation.len());
        for line in plan_lines(&book, &segmentation) {
            log::info!("  {line}");
        }

        if self.dry_run {
            println!("{} ({} words):", path.display(), book.total_words());
            for line in plan_lines(&book, &segmentation) {
                println!("  {line}");
            }
            return Ok(Vec::new());
        }

        let names: Vec<String> = segmentation
            .parts
            .iter()
            .map(|part| part_file_name(&book.stem, part.sequence_number, writer.extension()))
            .collect();

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_parts(names.len() as u64);

        let mut created = Vec::with_capacity(names.len());
        for (part, name) in segmentation.parts.iter().zip(&names) {
            log::debug!("Creating {name}");
            let bytes = writer
                .render(&book, part)
                .with_context(|| format!("Failed to render {name}"))?;
            let output_path = part_path(
                &config.output.directory,
                &book.stem,
                part.sequence_number,
                writer.extension(),
            );
            fs::write(&output_path, bytes)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            progress.part_written(name);
            created.push(output_path);
        }
        progress.finish();

        if config.output.manifest {
            let manifest = Manifest::new(
                path,
                &book,
                config.output.format.name(),
                segment_config,
                &segmentation,
                &names,
            );
            let manifest_path = config
                .output
                .directory
                .join(format!("{}_manifest.json", book.stem));
            fs::write(&manifest_path, manifest.to_json(config.output.pretty_json)?)
                .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
            log::info!("Wrote manifest {}", manifest_path.display());
        }

        Ok(created)
    }
}

/// One line per part: `Part i: chapters a-b (w words)`
pub(crate) fn plan_lines(book: &ExtractedBook, segmentation: &Segmentation) -> Vec<String> {
    let label = match book.format {
        SourceFormat::Epub => "chapters",
        SourceFormat::Pdf => "pages",
    };

    segmentation
        .parts
        .iter()
        .map(|part| {
            let first = part.first_unit().unwrap_or_default() + 1;
            let last = part.last_unit().unwrap_or_default() + 1;
            format!(
                "Part {}: {label} {first}-{last} ({} words)",
                part.sequence_number, part.total_words
            )
        })
        .collect()
}

/// Reject inputs that would write parts under the same names
fn check_distinct_stems(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(files.len());
    for path in files {
        let stem = file_stem(path);
        if let Some(first) = seen.get(&stem) {
            return Err(CliError::DuplicateStem {
                stem,
                first: first.display().to_string(),
                second: path.display().to_string(),
            }
            .into());
        }
        seen.insert(stem, path);
    }
    Ok(())
}

fn completion_summary(created: &[PathBuf]) -> String {
    let mut summary = format!("\nProcessing complete. Created {} files:\n", created.len());
    for (position, path) in created.iter().enumerate() {
        summary.push_str(&format!("  {}. {}\n", position + 1, path.display()));
    }
    summary
}
