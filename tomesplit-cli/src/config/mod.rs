//! Configuration module
//!
//! Settings come from an optional TOML file. Command-line flags override the
//! file, and the file overrides [`defaults`].

use crate::error::CliError;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tomesplit_core::SegmentConfig;

/// Default configuration values
pub mod defaults {
    /// Plain-text rendering width for EPUB documents, wide enough to avoid hard wraps
    pub const TEXT_WIDTH: usize = 10_000;

    /// Output directory
    pub const OUTPUT_DIR: &str = ".";
}

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Segmentation configuration
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Segmentation-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Maximum words per output file
    pub max_words: usize,

    /// Only split at chapter or section boundaries
    pub strict_boundaries: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        let core = SegmentConfig::default();
        Self {
            max_words: core.max_words,
            strict_boundaries: core.strict_boundaries,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Directory for output files
    pub directory: PathBuf,

    /// Write a JSON manifest next to the parts
    pub manifest: bool,

    /// Pretty print the JSON manifest
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            directory: PathBuf::from(defaults::OUTPUT_DIR),
            manifest: false,
            pretty_json: true,
        }
    }
}

/// Extraction-related configuration
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Detect PDF section headings; when off every page is a boundary
    pub detect_sections: bool,

    /// Column width used when rendering EPUB documents to plain text
    pub text_width: usize,

    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            detect_sections: true,
            text_width: defaults::TEXT_WIDTH,
            worker_threads: 0,
        }
    }
}

impl ExtractionConfig {
    /// Resolved worker count
    pub fn threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }
}

impl CliConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CliConfig =
            toml::from_str(content).map_err(|e| CliError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        self.segment_config()?;

        if self.extraction.text_width == 0 {
            return Err(CliError::ConfigError("text_width must be greater than 0".into()).into());
        }

        Ok(())
    }

    /// Engine configuration from the `[segmentation]` table
    pub fn segment_config(&self) -> Result<SegmentConfig> {
        SegmentConfig::builder()
            .max_words(self.segmentation.max_words)
            .strict_boundaries(self.segmentation.strict_boundaries)
            .build()
            .map_err(|e| CliError::ConfigError(e.to_string()).into())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
