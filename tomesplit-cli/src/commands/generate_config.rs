//! Generate config command implementation

use crate::config::{defaults, CliConfig};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = generate_template();

        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file to set your word budget and output");
        println!("2. Validate your configuration:");
        println!("   tomesplit validate-config -c {}", self.output.display());
        println!("3. Use it for splitting:");
        println!("   tomesplit split -i book.epub -c {}", self.output.display());

        Ok(())
    }
}

/// Template content, with every value set to its default
fn generate_template() -> String {
    let config = CliConfig::default();
    format!(
        r#"# tomesplit configuration
# Command-line flags override the values in this file.

[segmentation]
# Maximum words per output file
max_words = {max_words}

# Only split at chapter (EPUB) or detected section (PDF) boundaries,
# even when a part has to exceed max_words
strict_boundaries = {strict}

[output]
# Output format: "markdown" or "epub" (EPUB input only)
format = "{format}"

# Directory for output files
directory = "{directory}"

# Write {{stem}}_manifest.json describing the parts
manifest = {manifest}
pretty_json = {pretty}

[extraction]
# Look for chapter and section headings at the top of PDF pages.
# When disabled, or when nothing is found, every page is a boundary.
detect_sections = {detect}

# Column width for EPUB plain-text rendering
text_width = {width}

# Worker threads for extraction (0 = all cores)
worker_threads = {threads}
"#,
        max_words = config.segmentation.max_words,
        strict = config.segmentation.strict_boundaries,
        format = config.output.format,
        directory = defaults::OUTPUT_DIR,
        manifest = config.output.manifest,
        pretty = config.output.pretty_json,
        detect = config.extraction.detect_sections,
        width = config.extraction.text_width,
        threads = config.extraction.worker_threads,
    )
}
